use std::time::{Duration, Instant};

/// A repeating timer polled from the event loop, like `setInterval`.
///
/// The first tick is one period after `start`. Missed ticks collapse into a
/// single `due` so a stalled loop does not fire a burst.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl IntervalTimer {
    pub fn new(period: Duration, start: Instant) -> Self {
        let period = period.max(Duration::from_millis(1));
        Self {
            period,
            next_due: Some(start + period),
        }
    }

    /// True at most once per period while active.
    pub fn due(&mut self, now: Instant) -> bool {
        let Some(next) = self.next_due else {
            return false;
        };
        if now < next {
            return false;
        }

        let mut next = next;
        while next <= now {
            next += self.period;
        }
        self.next_due = Some(next);
        true
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }
}
