#![allow(clippy::too_many_arguments)]

mod animations;
mod app;
mod leaderboard;
mod render;
mod settings;
mod stats;
mod storage;
mod theme;

use anyhow::Context;
use app::{App, AppConfig};
use casefile_core::Catalog;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use settings::{Settings, ThemeName};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use storage::{Environment, Storage};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "casefile.log";

/// Logic-grid detective puzzles in the terminal
#[derive(Debug, Parser)]
#[command(name = "casefile", version, about)]
struct Args {
    /// Load cases from a JSON file instead of the built-in set
    #[arg(long, value_name = "FILE")]
    cases: Option<PathBuf>,

    /// Open this case straight away
    #[arg(long, value_name = "ID")]
    case: Option<String>,

    /// Directory for settings, progress and the leaderboard
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Colour theme for this run (saved to settings)
    #[arg(long, value_enum)]
    theme: Option<ThemeName>,

    /// Detective name for this run (saved to settings)
    #[arg(long, value_name = "NAME")]
    player: Option<String>,

    /// Make premium cases playable
    #[arg(long)]
    unlock_premium: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let dir = args.data_dir.clone().unwrap_or_else(Storage::default_dir);
    let storage = Storage::new(Environment::detect(), dir);
    init_logging(&storage)?;

    let catalog = load_catalog(args.cases.as_deref())?;

    let mut settings = Settings::load(&storage);
    if let Some(theme) = args.theme {
        settings.theme = theme;
    }
    if let Some(player) = &args.player {
        settings.set_player_name(player);
    }
    if args.theme.is_some() || args.player.is_some() {
        if let Err(e) = settings.save(&storage) {
            error!(error = %e, "failed to save settings");
        }
    }

    let mut app = App::new(AppConfig {
        catalog,
        storage,
        settings,
        unlock_premium: args.unlock_premium,
    });
    if let Some(case_id) = &args.case {
        app.open_case(case_id)?;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Run the app
    let result = run_app(&mut stdout, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;

    if let Err(e) = &result {
        error!(error = %e, "terminal loop failed");
    }
    info!("exiting");
    result.context("terminal error")
}

/// Log to a file in the data directory; nothing is logged when in memory
fn init_logging(storage: &Storage) -> anyhow::Result<()> {
    let Some(path) = storage.path(LOG_FILE) else {
        return Ok(());
    };
    storage.ensure_dir()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("CASEFILE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_catalog(path: Option<&std::path::Path>) -> anyhow::Result<Catalog> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read cases from {}", path.display()))?;
            Catalog::from_json(&json).with_context(|| format!("invalid case file {}", path.display()))
        }
        None => Catalog::builtin().context("built-in cases are invalid"),
    }
}

fn run_app(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        // Determine tick rate based on screen mode
        let tick_rate = app.get_tick_rate();

        // Render
        render::render(stdout, app)?;
        stdout.flush()?;

        // Handle input with timeout for animation updates
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            if let Event::Key(key) = event::read()? {
                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    app::AppAction::Continue => {}
                    app::AppAction::Quit => break,
                }
            }
        }

        // Tick animations and message timer
        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
