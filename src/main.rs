//! Arena Duel entry point
//!
//! Loads the arena, engine config and settings, attaches the optional pulse
//! sensors, then either runs a headless pass that writes a PPM snapshot or the
//! interactive terminal loop.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};

use arena_duel::config::{EngineConfig, Preset};
use arena_duel::platform::{Command, KeyboardInput, TerminalPresenter, pixel_size};
use arena_duel::sensor::SensorSource;
use arena_duel::session::FrameClock;
use arena_duel::sim::{ArenaGrid, PlayerSlot};
use arena_duel::{Session, Settings};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Arena grid JSON document
    #[arg(value_name = "GRID")]
    grid: PathBuf,

    /// Built-in engine preset
    #[arg(long, value_name = "NAME", default_value = "combat", value_parser = parse_preset)]
    preset: Preset,

    /// JSON engine config (replaces the preset; missing fields take combat defaults)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Persisted tunables
    #[arg(long, value_name = "FILE", default_value = "settings.json")]
    settings: PathBuf,

    /// Pulse sensor for player one (device path or tcp:HOST:PORT)
    #[arg(long, value_name = "SOURCE")]
    sensor1: Option<SensorSource>,

    /// Pulse sensor for player two (device path or tcp:HOST:PORT)
    #[arg(long, value_name = "SOURCE")]
    sensor2: Option<SensorSource>,

    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Run this many ticks without a terminal and write a snapshot
    #[arg(long, value_name = "TICKS")]
    headless_ticks: Option<u64>,

    /// Snapshot path for headless mode (binary PPM)
    #[arg(long, value_name = "FILE", default_value = "snapshot.ppm")]
    snapshot: PathBuf,

    /// Snapshot width in pixels
    #[arg(long, value_name = "PIXELS", default_value_t = 320, value_parser = clap::value_parser!(u32).range(2..=8192))]
    width: u32,

    /// Snapshot height in pixels
    #[arg(long, value_name = "PIXELS", default_value_t = 120, value_parser = clap::value_parser!(u32).range(1..=8192))]
    height: u32,
}

fn parse_preset(s: &str) -> Result<Preset, String> {
    Preset::from_str(s).ok_or_else(|| format!("unknown preset `{s}` (expected classic or combat)"))
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(&args)?;

    let grid = ArenaGrid::load(&args.grid)
        .with_context(|| format!("failed to load arena {}", args.grid.display()))?;
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load engine config {}", path.display()))?,
        None => {
            log::info!("Using {} preset", args.preset.as_str());
            args.preset.config()
        }
    };
    let settings = Settings::load(&args.settings);

    let mut session = Session::new(grid, config, settings);
    for (slot, source) in [(PlayerSlot::One, &args.sensor1), (PlayerSlot::Two, &args.sensor2)] {
        if let Some(source) = source {
            session.attach_sensor(slot, source.clone());
        }
    }

    match args.headless_ticks {
        Some(ticks) => run_headless(&mut session, ticks, &args),
        None => run_interactive(&mut session, &args.settings),
    }
}

fn init_logging(args: &CliArgs) -> Result<()> {
    // The terminal owns stderr while interactive, so only errors go there
    let default_level = if args.log_file.is_some() || args.headless_ticks.is_some() {
        "info"
    } else {
        "error"
    };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if let Some(path) = &args.log_file {
        let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn run_headless(session: &mut Session, ticks: u64, args: &CliArgs) -> Result<()> {
    let frame = session.run_headless(ticks, args.width as usize, args.height as usize);
    let file = File::create(&args.snapshot)
        .with_context(|| format!("failed to create snapshot {}", args.snapshot.display()))?;
    let mut out = BufWriter::new(file);
    frame.write_ppm(&mut out)?;
    out.flush()?;
    log::info!("Snapshot written to {}", args.snapshot.display());
    println!("{}", session.status_line());
    Ok(())
}

fn run_interactive(session: &mut Session, settings_path: &Path) -> Result<()> {
    let mut term = TerminalPresenter::new();
    term.enter().context("failed to set up terminal")?;

    let result = run(session, &mut term, settings_path);

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(e) = session.settings().save(settings_path) {
        log::warn!("Could not save settings: {e}");
    }
    log::info!("Session stopped at tick {}: {}", session.state().time_ticks, session.status_line());
    result
}

fn run(session: &mut Session, term: &mut TerminalPresenter, settings_path: &Path) -> Result<()> {
    let mut input = KeyboardInput::new(term.release_events());
    let mut clock = FrameClock::default();

    loop {
        // Input with timeout until next tick.
        if event::poll(clock.remaining(Instant::now()))? {
            match event::read()? {
                Event::Key(key) => match input.handle_key(key, Instant::now()) {
                    Some(Command::Quit) => return Ok(()),
                    Some(Command::AdjustSensitivity(delta)) => {
                        let value = session.adjust_sensitivity(delta);
                        log::info!("Sensitivity set to {value}");
                        if let Err(e) = session.settings().save(settings_path) {
                            log::warn!("Could not save settings: {e}");
                        }
                    }
                    None => {}
                },
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        let now = Instant::now();
        if !clock.due(now) {
            continue;
        }

        session.step(input.controls(now));

        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        let (width, height) = pixel_size(cols, rows);
        let status = session.status_line();
        let frame = session.render(width, height);
        term.present(frame, &status)?;
    }
}
