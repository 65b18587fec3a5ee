//! Oric emulator binary.
//!
//! Headless: runs a number of frames over a ROM and/or raw memory images,
//! then saves a screenshot or a numbered frame sequence.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::{ArgAction, Parser};
use emu_core::parse_address;
use emu_oric::{Oric, OricConfig, RamSize, capture};
use log::{Level, Log, Metadata, Record, info};
use oric_ula::TimingProfile;

#[derive(Parser)]
#[command(author, version, about = "Headless Oric-1 / Atmos emulator", long_about = None)]
struct Args {
    /// JSON machine config.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 16K ROM image (overrides the config).
    #[arg(long)]
    rom: Option<PathBuf>,

    /// RAM fitted: 16K, 48K or 64K (overrides the config).
    #[arg(long, value_parser = parse_ram)]
    ram: Option<RamSize>,

    /// Raw image to copy into RAM before the first frame. Repeatable.
    #[arg(long = "load", value_name = "ADDR:FILE", value_parser = parse_load)]
    loads: Vec<(u16, PathBuf)>,

    /// Frames to run.
    #[arg(short, long, default_value_t = 100)]
    frames: u32,

    /// Save the last frame as a PNG.
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Save every frame as a numbered PNG in this directory.
    #[arg(long, value_name = "DIR")]
    record: Option<PathBuf>,

    /// Run as fast as possible instead of at 50/60 frames per second.
    #[arg(long)]
    warp: bool,

    /// Power on at 60 Hz.
    #[arg(long)]
    ntsc: bool,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_ram(text: &str) -> Result<RamSize, String> {
    match text.to_ascii_uppercase().as_str() {
        "16K" | "16" => Ok(RamSize::Ram16K),
        "48K" | "48" => Ok(RamSize::Ram48K),
        "64K" | "64" => Ok(RamSize::Ram64K),
        _ => Err(format!("unknown RAM size '{text}' (expected 16K, 48K or 64K)")),
    }
}

fn parse_load(text: &str) -> Result<(u16, PathBuf), String> {
    let (addr, file) = text
        .split_once(':')
        .ok_or_else(|| format!("expected ADDR:FILE, got '{text}'"))?;
    let addr = parse_address(addr).ok_or_else(|| format!("bad address '{addr}'"))?;
    Ok((addr, PathBuf::from(file)))
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level.to_level_filter());
    }
}

// ---------------------------------------------------------------------------
// Headless run
// ---------------------------------------------------------------------------

fn make_config(args: &Args) -> Result<OricConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => OricConfig::from_json_file(path)?,
        None => OricConfig::default(),
    };
    if let Some(rom) = &args.rom {
        config.rom = Some(rom.clone());
    }
    if let Some(ram) = args.ram {
        config.ram = ram;
    }
    if args.ntsc {
        config.timing = TimingProfile::Hz60;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = make_config(args)?;
    let (mut oric, mut reader) = Oric::new(&config)?;

    for (addr, file) in &args.loads {
        let data = fs::read(file)?;
        oric.load_ram(*addr, &data)?;
        info!("loaded {} ({} bytes) at ${addr:04X}", file.display(), data.len());
    }

    if let Some(dir) = &args.record {
        capture::save_frame_sequence(&mut oric, &mut reader, dir, args.frames)?;
        eprintln!("Recorded {} frames to {}", args.frames, dir.display());
        return Ok(());
    }

    if args.warp {
        oric.run_frames_warp(args.frames);
    } else {
        for _ in 0..args.frames {
            let start = Instant::now();
            oric.run_frame();
            let frame_time = Duration::from_secs(1) / oric.timing().frames_per_second();
            if let Some(rest) = frame_time.checked_sub(start.elapsed()) {
                thread::sleep(rest);
            }
        }
    }
    info!("{}, {} cycles", oric.ula(), oric.cycles());

    if let Some(path) = &args.screenshot {
        capture::save_screenshot(&mut reader, path)?;
        eprintln!("Screenshot saved to {}", path.display());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
