use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config;
use crate::engine::{LoadOptions, RodioEngine};
use crate::error::ScheduleError;
use crate::library;
use crate::player::{PlaybackController, PlayerOptions};
use crate::schedule::{GateTiming, ScheduleGate, ShowWindow};
use crate::ui::Wave;

mod event_loop;
mod settings;


/// Terminal playlist player that starts its program on the hour.
#[derive(Debug, Parser)]
#[command(name = "showtime", version, about)]
pub struct Cli {
    /// Audio files or directories, played in the order given.
    pub paths: Vec<PathBuf>,

    /// Start this many seconds after play is pressed instead of on the clock.
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true, conflicts_with = "now")]
    pub offset: Option<f64>,

    /// Ignore the schedule and play as soon as play is pressed.
    #[arg(long)]
    pub now: bool,

    /// Config file to use instead of the default location.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where to write logs (default: showtime.log in the temp dir).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print the effective settings as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Whether the first play goes through the schedule gate.
    fn scheduled(&self, settings: &config::Settings) -> bool {
        !self.now && (settings.schedule.enabled || self.offset.is_some())
    }
}

fn init_logging(path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.unwrap_or_else(|| env::temp_dir().join("showtime.log"));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let filter =
        EnvFilter::try_from_env("SHOWTIME_LOG").unwrap_or_else(|_| EnvFilter::new("showtime=info"));

    // The terminal belongs to the UI, so logs go to a file.
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init()?;
    Ok(())
}

fn player_options(settings: &config::Settings) -> PlayerOptions {
    PlayerOptions {
        load: LoadOptions {
            looping: settings.audio.looping,
            streaming: settings.audio.streaming,
        },
        auto_advance: settings.playback.auto_advance,
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = settings::load_settings(cli.config.as_deref())?;

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&settings)?);
        return Ok(());
    }

    if let Some(offset) = cli.offset {
        if !offset.is_finite() || offset < 0.0 {
            return Err(ScheduleError::InvalidOffset(offset).into());
        }
    }

    init_logging(cli.log_file.clone())?;

    let paths = if cli.paths.is_empty() {
        vec![env::current_dir()?]
    } else {
        cli.paths.clone()
    };
    let tracks = library::collect(&paths, &settings.library);
    info!(tracks = tracks.len(), "library scanned");

    let engine = RodioEngine::new(settings.audio.volume);
    let mut player = PlaybackController::new(engine, tracks, player_options(&settings))?;

    let window = ShowWindow::from_settings(&settings.schedule)?;
    let gate = ScheduleGate::new(window, GateTiming::from(&settings.schedule));
    let mut state = event_loop::EventLoopState::new(gate, cli.scheduled(&settings), cli.offset);
    let mut wave = Wave::new(&settings.ui);
    info!(scheduled = state.scheduled, alignment = ?window.alignment(), "ready");

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut player, &mut state, &mut wave);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
