use std::io::Stdout;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info, warn};

use crate::config;
use crate::engine::AudioEngine;
use crate::error::PlayerError;
use crate::player::{Direction, PlaybackController};
use crate::schedule::{GateStatus, ScheduleGate, wall_clock_now};
use crate::ui::{self, Wave};

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    pub gate: ScheduleGate,
    /// Whether the first play waits for showtime.
    pub scheduled: bool,
    /// Fixed delay in seconds for the first play, instead of the clock.
    pub offset: Option<f64>,
    /// The first play has been handed to the gate (or bypassed it).
    armed: bool,
    pub playlist_open: bool,
    pub volume_open: bool,
    /// Highlighted row in the playlist panel.
    pub cursor: usize,
    /// Last error worth showing in the status box.
    pub notice: Option<String>,
}

impl EventLoopState {
    pub fn new(gate: ScheduleGate, scheduled: bool, offset: Option<f64>) -> Self {
        Self {
            gate,
            scheduled,
            offset,
            armed: false,
            playlist_open: false,
            volume_open: false,
            cursor: 0,
            notice: None,
        }
    }

    fn report(&mut self, result: Result<(), PlayerError>) {
        if let Err(e) = result {
            warn!(error = %e, "playback command failed");
            self.notice = Some(e.to_string());
        }
    }

    /// The user took over: drop any pending showtime start.
    fn take_over<E: AudioEngine>(&mut self, player: &mut PlaybackController<E>) {
        self.armed = true;
        if self.gate.cancel(player) {
            info!("manual playback, pending showtime cancelled");
        }
    }
}

/// Main terminal event loop: pumps engine events, drives the schedule gate
/// and the progress loop, draws, and handles input. Returns `Ok(())` when
/// shutdown is requested.
pub fn run<E: AudioEngine>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    settings: &config::Settings,
    player: &mut PlaybackController<E>,
    state: &mut EventLoopState,
    wave: &mut Wave,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame_interval = Duration::from_millis(settings.ui.frame_ms);

    loop {
        step(player, state, wave, wall_clock_now(), Instant::now());

        let now = wall_clock_now();
        let remaining = state.gate.remaining_secs(now);
        let view = ui::View {
            display: player.display(),
            transport: player.transport_state(),
            titles: player.playlist().tracks().map(|t| t.title.as_str()).collect(),
            active: player.active_index(),
            countdown: remaining,
            joining: state.gate.is_joining(),
            notice: state.notice.as_deref(),
            playlist_open: state.playlist_open,
            cursor: state.cursor,
            volume_open: state.volume_open,
            volume_step: settings.audio.volume_step,
        };
        terminal.draw(|f| ui::draw(f, &view, wave))?;

        if event::poll(frame_interval)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, player, state, wall_clock_now(), Instant::now())
                {
                    break;
                }
            }
        }
    }

    state.gate.cancel(player);
    player.shutdown();
    info!("shutting down");
    Ok(())
}

/// One iteration of background work: engine notices, the gate, one
/// progress frame and one waveform frame.
pub(super) fn step<E: AudioEngine>(
    player: &mut PlaybackController<E>,
    state: &mut EventLoopState,
    wave: &mut Wave,
    now: DateTime<FixedOffset>,
    at: Instant,
) {
    player.tick();
    let pumped = player.pump_events();
    state.report(pumped);

    match state.gate.drive(now, at, player) {
        Ok(GateStatus::GaveUp) => {
            state.notice = Some("playback did not start in time".to_string());
        }
        Ok(_) => {}
        Err(e) => state.report(Err(e)),
    }

    // The gate may have started playback.
    let pumped = player.pump_events();
    state.report(pumped);
    player.on_frame();

    if player.display().wave_visible {
        wave.start();
    } else {
        wave.stop();
    }
    wave.advance();
}

/// Handle one key press. Returns true when the user asked to quit.
pub(super) fn handle_key_event<E: AudioEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    player: &mut PlaybackController<E>,
    state: &mut EventLoopState,
    now: DateTime<FixedOffset>,
    at: Instant,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if state.playlist_open {
        let len = player.playlist().len();
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc | KeyCode::Char('t') => state.playlist_open = false,
            KeyCode::Char('j') | KeyCode::Down => state.cursor = (state.cursor + 1) % len,
            KeyCode::Char('k') | KeyCode::Up => state.cursor = (state.cursor + len - 1) % len,
            KeyCode::Enter => {
                state.playlist_open = false;
                state.take_over(player);
                let result = player.skip_to(state.cursor);
                state.report(result);
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.notice = None;
            let result = toggle_play(player, state, now, at);
            state.report(result);
        }
        KeyCode::Char('l') => {
            state.take_over(player);
            let result = player.skip(Direction::Next);
            state.report(result);
        }
        KeyCode::Char('h') => {
            state.take_over(player);
            let result = player.skip(Direction::Prev);
            state.report(result);
        }
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = f64::from(c.to_digit(10).unwrap_or(0));
            player.seek_to_fraction(tenth / 10.0);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            change_volume(player, state, settings.audio.volume_step);
        }
        KeyCode::Char('-') => {
            change_volume(player, state, -settings.audio.volume_step);
        }
        KeyCode::Char('v') => state.volume_open = !state.volume_open,
        KeyCode::Char('t') => {
            state.playlist_open = true;
            state.cursor = player.active_index();
        }
        KeyCode::Esc => state.volume_open = false,
        _ => {}
    }

    false
}

/// Step the volume. While a join is still muted the step applies to the
/// volume the join restores.
fn change_volume<E: AudioEngine>(
    player: &mut PlaybackController<E>,
    state: &mut EventLoopState,
    delta: f32,
) {
    if let Some(level) = state.gate.restore_volume() {
        state.gate.set_restore_volume(level + delta);
    } else {
        player.set_volume(player.volume() + delta);
    }
}

/// Pause if playing; otherwise play. The first play is handed to the
/// schedule gate, and a play while the gate is still waiting starts at once.
/// A join in progress is left to finish its seek.
fn toggle_play<E: AudioEngine>(
    player: &mut PlaybackController<E>,
    state: &mut EventLoopState,
    now: DateTime<FixedOffset>,
    at: Instant,
) -> Result<(), PlayerError> {
    if state.gate.is_joining() {
        debug!("play ignored: joining in progress");
        return Ok(());
    }
    if state.gate.is_pending() {
        state.take_over(player);
    } else if state.scheduled && !state.armed {
        state.armed = true;
        state.gate.begin(now, at, state.offset, player)?;
        return Ok(());
    }

    if player.is_playing() {
        player.pause();
        Ok(())
    } else {
        state.armed = true;
        player.play(None)
    }
}
