mod config;
mod engine;
mod error;
mod format;
mod library;
mod player;
mod runtime;
mod schedule;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
