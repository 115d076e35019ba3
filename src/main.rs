//! Runs a chip8 rom inside the terminal.
//!
//! The hex keypad is mapped onto the left block of the keyboard:
//!
//! ```text
//! 1 2 3 C          1 2 3 4
//! 4 5 6 D          Q W E R
//! 7 8 9 E          A S D F
//! A 0 B F          Z X C V
//! ```
//!
//! Escape quits. The log goes into a file, as the terminal is taken up by the board.
use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chip::{
    chip8::Machine,
    definitions::{cpu, display, Config},
};
use clap::Parser;

mod adapters;
mod definitions;
mod terminal;

use adapters::{DisplayAdapter, FrameBuffer};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the rom that shall be run
    rom: PathBuf,

    /// Instructions executed per second
    #[arg(short, long, default_value_t = cpu::HERTZ)]
    frequency: u64,

    /// Frames painted per second
    #[arg(long, default_value_t = display::FPS)]
    fps: u64,

    /// The file the log is written into, the level is taken from `RUST_LOG`
    #[arg(long, default_value = definitions::cli::LOG_FILE)]
    log_file: PathBuf,
}

/// Will install the logger, writing into the given file.
fn setup_logger(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Unable to create the log file {}", path.display()))?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(definitions::cli::LOG_LEVEL),
    )
    .target(env_logger::Target::Pipe(Box::new(file)))
    .try_init()
    .context("Unable to install the logger")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logger(&args.log_file)?;

    let rom = std::fs::read(&args.rom)
        .with_context(|| format!("Unable to read the rom {}", args.rom.display()))?;
    let config = Config {
        frequency: args.frequency,
        fps: args.fps,
        ..Config::default()
    };
    log::info!("Running {} with {:?}", args.rom.display(), config);

    let mut machine: Machine = Machine::new(config);
    machine.load_rom(&rom).context("Unable to load the rom")?;

    let frame = FrameBuffer::new(&config);
    let mut runner = chip::run(machine, DisplayAdapter::new(frame.clone()));

    let shown = terminal::run(&runner, &frame, &config);
    let stopped = runner.stop();

    shown?;
    stopped.context("The machine stopped on an error, the state was written to the log")
}
