//! Wall-clock scheduling: when the first play actually starts, and how far
//! into the program a late listener joins.

mod gate;
mod timer;
mod window;

use chrono::{DateTime, FixedOffset, Local};

pub use gate::{GateStatus, GateTiming, ScheduleGate};
pub use timer::IntervalTimer;
pub use window::{Alignment, ScheduleMode, ScheduleTarget, ShowWindow, plan};

/// Local wall-clock time with its current UTC offset.
pub fn wall_clock_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}
