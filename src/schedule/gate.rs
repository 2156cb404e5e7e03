use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info, warn};

use crate::config::ScheduleSettings;
use crate::engine::AudioEngine;
use crate::error::Result;
use crate::player::PlaybackController;

use super::timer::IntervalTimer;
use super::window::{ScheduleMode, ScheduleTarget, ShowWindow, plan, seconds_between};

/// Timer settings for the gate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GateTiming {
    pub poll_interval: Duration,
    pub settle: Duration,
    pub settle_timeout: Duration,
}

impl Default for GateTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            settle: Duration::from_millis(100),
            settle_timeout: Duration::from_secs(3),
        }
    }
}

impl From<&ScheduleSettings> for GateTiming {
    fn from(s: &ScheduleSettings) -> Self {
        Self {
            poll_interval: Duration::from_millis(s.poll_interval_ms),
            settle: Duration::from_millis(s.settle_ms),
            settle_timeout: Duration::from_millis(s.settle_timeout_ms),
        }
    }
}

/// What `ScheduleGate::drive` observed this iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum GateStatus {
    /// Nothing scheduled.
    Idle,
    /// Polling for showtime.
    Waiting { remaining_secs: i64 },
    /// Started muted; waiting to seek into the program.
    Joining,
    /// Playback started at `offset_secs` into the track. Reported once.
    Started { offset_secs: f64 },
    /// The join seek never happened because playback did not start in time.
    GaveUp,
}

enum Phase {
    Idle,
    Waiting {
        target: DateTime<FixedOffset>,
        poll: IntervalTimer,
    },
    Settling {
        window_start: DateTime<FixedOffset>,
        prior_volume: f32,
        deadline: Instant,
        give_up_at: Instant,
    },
}

/// Holds back the first play until showtime, or joins a program in progress.
pub struct ScheduleGate {
    window: ShowWindow,
    timing: GateTiming,
    phase: Phase,
    target: Option<ScheduleTarget>,
}

impl ScheduleGate {
    pub fn new(window: ShowWindow, timing: GateTiming) -> Self {
        Self {
            window,
            timing,
            phase: Phase::Idle,
            target: None,
        }
    }

    /// Plan a start from `now` and arm it.
    ///
    /// Inside the window this mutes, starts playback and waits `settle`
    /// before seeking; otherwise it starts polling for the target time.
    /// `at` is the monotonic instant matching `now`.
    pub fn begin<E: AudioEngine>(
        &mut self,
        now: DateTime<FixedOffset>,
        at: Instant,
        manual_offset: Option<f64>,
        player: &mut PlaybackController<E>,
    ) -> Result<ScheduleTarget> {
        self.cancel(player);

        let target = plan(now, &self.window, manual_offset)?;
        match target.mode {
            ScheduleMode::WaitUntil => {
                info!(target = %target.target, manual = manual_offset.is_some(), "waiting for showtime");
                self.phase = Phase::Waiting {
                    target: target.target,
                    poll: IntervalTimer::new(self.timing.poll_interval, at),
                };
            }
            ScheduleMode::ImmediateWithOffset => {
                info!(offset = ?target.offset_seconds, "showtime already started, joining in progress");
                let prior_volume = player.volume();
                player.set_volume(0.0);
                if let Err(e) = player.play(None) {
                    player.set_volume(prior_volume);
                    return Err(e);
                }
                self.phase = Phase::Settling {
                    window_start: target.target,
                    prior_volume,
                    deadline: at + self.timing.settle,
                    give_up_at: at + self.timing.settle_timeout,
                };
            }
        }

        self.target = Some(target.clone());
        Ok(target)
    }

    /// Advance the pending start, if any. Call once per event-loop iteration.
    pub fn drive<E: AudioEngine>(
        &mut self,
        now: DateTime<FixedOffset>,
        at: Instant,
        player: &mut PlaybackController<E>,
    ) -> Result<GateStatus> {
        match &mut self.phase {
            Phase::Idle => Ok(GateStatus::Idle),
            Phase::Waiting { target, poll } => {
                let target = *target;
                let remaining_secs = remaining(now, target);
                if !poll.due(at) {
                    return Ok(GateStatus::Waiting { remaining_secs });
                }
                if now < target {
                    debug!(remaining_secs, "seconds until audio");
                    return Ok(GateStatus::Waiting { remaining_secs });
                }

                // Stop polling before playing so it cannot fire twice.
                poll.cancel();
                self.phase = Phase::Idle;
                self.target = None;
                info!("showtime, starting playback");
                player.play(None)?;
                Ok(GateStatus::Started { offset_secs: 0.0 })
            }
            Phase::Settling {
                window_start,
                prior_volume,
                deadline,
                give_up_at,
            } => {
                if at < *deadline {
                    return Ok(GateStatus::Joining);
                }

                let (window_start, prior_volume) = (*window_start, *prior_volume);
                if player.is_playing() {
                    let offset_secs = seconds_between(window_start, now);
                    player.seek_to_seconds(offset_secs);
                    player.set_volume(prior_volume);
                    self.phase = Phase::Idle;
                    self.target = None;
                    info!(offset_secs, "joined in progress");
                    return Ok(GateStatus::Started { offset_secs });
                }

                if at >= *give_up_at {
                    player.set_volume(prior_volume);
                    self.phase = Phase::Idle;
                    self.target = None;
                    warn!("playback did not start in time, skipping join seek");
                    return Ok(GateStatus::GaveUp);
                }

                *deadline = at + self.timing.settle;
                Ok(GateStatus::Joining)
            }
        }
    }

    /// Drop any pending start. Returns true only if something was pending.
    ///
    /// A join that is still muted gets its volume back.
    pub fn cancel<E: AudioEngine>(&mut self, player: &mut PlaybackController<E>) -> bool {
        self.target = None;
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => false,
            Phase::Waiting { .. } => {
                info!("showtime wait cancelled");
                true
            }
            Phase::Settling { prior_volume, .. } => {
                player.set_volume(prior_volume);
                info!("join cancelled");
                true
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Seconds left until a waiting start fires.
    pub fn remaining_secs(&self, now: DateTime<FixedOffset>) -> Option<i64> {
        match &self.phase {
            Phase::Waiting { target, .. } => Some(remaining(now, *target)),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&ScheduleTarget> {
        self.target.as_ref()
    }

    /// Started muted and waiting to seek into the program.
    pub fn is_joining(&self) -> bool {
        matches!(self.phase, Phase::Settling { .. })
    }

    /// Volume a join in progress will restore once it has seeked.
    pub fn restore_volume(&self) -> Option<f32> {
        match &self.phase {
            Phase::Settling { prior_volume, .. } => Some(*prior_volume),
            _ => None,
        }
    }

    /// Change the volume a join restores. Returns false when not joining.
    pub fn set_restore_volume(&mut self, level: f32) -> bool {
        match &mut self.phase {
            Phase::Settling { prior_volume, .. } => {
                *prior_volume = level.clamp(0.0, 1.0);
                true
            }
            _ => false,
        }
    }
}

/// Whole seconds left, rounded up, never negative.
fn remaining(now: DateTime<FixedOffset>, target: DateTime<FixedOffset>) -> i64 {
    let ms = (target - now).num_milliseconds().max(0);
    (ms + 999) / 1000
}
