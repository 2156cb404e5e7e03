//! The self-terminating progress loop.
//!
//! A step runs only on a frame that was requested, and a step requests the
//! next frame only while the track is still playing. Requests coalesce, so
//! at most one loop is ever pending.

#[derive(Debug, Default)]
pub struct FrameLoop {
    requested: bool,
    cancelled: bool,
}

impl FrameLoop {
    /// Ask for a step on the next frame. Ignored after `cancel`.
    pub fn request(&mut self) {
        if !self.cancelled {
            self.requested = true;
        }
    }

    /// Consume the pending request, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }

    pub fn is_pending(&self) -> bool {
        self.requested
    }

    /// Stop the loop for good.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.requested = false;
    }
}

/// `position / duration`, or 0 when that is not a usable number.
pub fn progress_fraction(position_secs: f64, duration_secs: f64) -> f64 {
    let f = position_secs / duration_secs;
    if f.is_finite() { f.clamp(0.0, 1.0) } else { 0.0 }
}
