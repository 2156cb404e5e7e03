use chrono::{DateTime, FixedOffset, TimeDelta, Timelike};

use crate::config::{AlignmentSetting, ScheduleSettings};
use crate::error::ScheduleError;

/// Wall-clock boundary the program starts on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Alignment {
    Hour,
    Minute,
}

impl Alignment {
    pub fn period_secs(self) -> u64 {
        match self {
            Alignment::Hour => 3600,
            Alignment::Minute => 60,
        }
    }

    /// The most recent boundary at or before `now`, in `now`'s offset.
    pub fn floor(self, now: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>, ScheduleError> {
        let truncated = match self {
            Alignment::Hour => now.with_minute(0).and_then(|t| t.with_second(0)),
            Alignment::Minute => now.with_second(0),
        };
        truncated
            .and_then(|t| t.with_nanosecond(0))
            .ok_or_else(|| ScheduleError::Boundary(format!("cannot align {now} to {self:?}")))
    }
}

impl From<AlignmentSetting> for Alignment {
    fn from(a: AlignmentSetting) -> Self {
        match a {
            AlignmentSetting::Hour => Alignment::Hour,
            AlignmentSetting::Minute => Alignment::Minute,
        }
    }
}

/// The `[start, start + duration)` span after each boundary during which
/// late listeners join in progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShowWindow {
    alignment: Alignment,
    duration_secs: u64,
}

impl ShowWindow {
    pub fn new(alignment: Alignment, duration_secs: u64) -> Result<Self, ScheduleError> {
        let period_secs = alignment.period_secs();
        if duration_secs == 0 || duration_secs > period_secs {
            return Err(ScheduleError::InvalidWindow {
                window_secs: duration_secs,
                period_secs,
            });
        }
        Ok(Self {
            alignment,
            duration_secs,
        })
    }

    pub fn from_settings(settings: &ScheduleSettings) -> Result<Self, ScheduleError> {
        Self::new(settings.alignment.into(), settings.window_secs)
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn start(&self, now: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>, ScheduleError> {
        self.alignment.floor(now)
    }

    pub fn end(&self, now: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>, ScheduleError> {
        add_secs(self.start(now)?, self.duration_secs)
    }

    pub fn next_start(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<DateTime<FixedOffset>, ScheduleError> {
        add_secs(self.start(now)?, self.alignment.period_secs())
    }
}

fn add_secs(t: DateTime<FixedOffset>, secs: u64) -> Result<DateTime<FixedOffset>, ScheduleError> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|d| t.checked_add_signed(d))
        .ok_or_else(|| ScheduleError::Boundary(format!("{t} + {secs}s is out of range")))
}

/// Seconds from `earlier` to `later` with millisecond precision, never negative.
pub fn seconds_between(earlier: DateTime<FixedOffset>, later: DateTime<FixedOffset>) -> f64 {
    ((later - earlier).num_milliseconds() as f64 / 1000.0).max(0.0)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScheduleMode {
    /// The program is on: start now and seek `offset_seconds` in.
    ImmediateWithOffset,
    /// Start from the top once the clock reaches `target`.
    WaitUntil,
}

/// The decision for one play attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTarget {
    pub mode: ScheduleMode,
    pub target: DateTime<FixedOffset>,
    pub offset_seconds: Option<f64>,
}

/// Decide when and where playback starts.
///
/// A manual offset bypasses the wall-clock window: playback starts from the
/// top `offset` seconds after `now`. Otherwise a `now` inside the window
/// joins in progress, and anything later waits for the next boundary.
pub fn plan(
    now: DateTime<FixedOffset>,
    window: &ShowWindow,
    manual_offset: Option<f64>,
) -> Result<ScheduleTarget, ScheduleError> {
    if let Some(offset) = manual_offset {
        if !offset.is_finite() || offset < 0.0 {
            return Err(ScheduleError::InvalidOffset(offset));
        }
        let target = TimeDelta::try_milliseconds((offset * 1000.0).round() as i64)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or(ScheduleError::InvalidOffset(offset))?;
        return Ok(ScheduleTarget {
            mode: ScheduleMode::WaitUntil,
            target,
            offset_seconds: None,
        });
    }

    let start = window.start(now)?;
    let end = window.end(now)?;
    if start <= now && now < end {
        return Ok(ScheduleTarget {
            mode: ScheduleMode::ImmediateWithOffset,
            target: start,
            offset_seconds: Some(seconds_between(start, now)),
        });
    }

    Ok(ScheduleTarget {
        mode: ScheduleMode::WaitUntil,
        target: window.next_start(now)?,
        offset_seconds: None,
    })
}
