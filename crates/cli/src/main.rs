//! Command-line front end for the mr32sim instruction-set simulator.
//!
//! This binary runs one program image to completion. It performs:
//! 1. **Configuration:** Built-in defaults, optionally a JSON file, then command-line overrides.
//! 2. **Run:** Loads the image, runs the CPU task and, with `--gfx`, the presentation loop.
//! 3. **Report:** Exits with the program status (or a fault class code), prints an `error:` line
//!    on stderr for abnormal halts and, when verbose, prints the exit code and statistics.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use mr32sim_core::common::constants::EXIT_FAILURE;
use mr32sim_core::config::{Config, DumpConfig, TraceFormat};
use mr32sim_core::sim::RunReport;
use mr32sim_core::sim::presentation::{Display, HeadlessDisplay};
use mr32sim_core::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "mr32sim",
    author,
    version,
    about = "Instruction-set simulator for a 32-bit vector RISC CPU",
    long_about = "Run a raw program image. Without --addr the first four bytes of the image are the \
                  little-endian load address.\n\nNumeric options accept decimal, 0x hex and 0b \
                  binary.\n\nExamples:\n  mr32sim program.bin\n  mr32sim -v -c 1000000 program.bin\n  \
                  mr32sim -A 0x200 --trace run.trace --trace-format text program.raw"
)]
struct Cli {
    /// Print the exit code and statistics after the run.
    #[arg(short, long)]
    verbose: bool,

    /// Run the presentation loop over the framebuffer window.
    #[arg(short = 'g', long)]
    gfx: bool,

    /// Framebuffer base address.
    #[arg(long, value_parser = parse_u32)]
    gfx_addr: Option<u32>,

    /// Framebuffer width in pixels.
    #[arg(long, value_parser = parse_u32)]
    gfx_width: Option<u32>,

    /// Framebuffer height in pixels.
    #[arg(long, value_parser = parse_u32)]
    gfx_height: Option<u32>,

    /// Framebuffer depth in bits per pixel (8, 16 or 32).
    #[arg(long, value_parser = parse_u32)]
    gfx_depth: Option<u32>,

    /// Save the final frame as a PPM image.
    #[arg(long)]
    gfx_snapshot: Option<PathBuf>,

    /// Write an instruction trace to FILE.
    #[arg(short, long, value_name = "FILE")]
    trace: Option<PathBuf>,

    /// Trace encoding.
    #[arg(long, value_enum, default_value_t = TraceArg::Binary)]
    trace_format: TraceArg,

    /// RAM size in bytes.
    #[arg(short = 'R', long, value_parser = parse_u64)]
    ram_size: Option<u64>,

    /// Load address; the image then has no address header.
    #[arg(short = 'A', long, value_parser = parse_u32)]
    addr: Option<u32>,

    /// Stop after this many cycles.
    #[arg(short = 'c', long, value_parser = parse_u64)]
    cycles: Option<u64>,

    /// Dump a memory range to FILE after the run.
    #[arg(long, value_name = "FILE")]
    dump: Option<PathBuf>,

    /// First byte of the dump range.
    #[arg(long, value_parser = parse_u32, default_value = "0x40000000")]
    dump_begin: u32,

    /// One past the last byte of the dump range.
    #[arg(long, value_parser = parse_u32, default_value = "0x40040000")]
    dump_end: u32,

    /// JSON configuration file; command-line options override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Program image.
    program: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TraceArg {
    Binary,
    Text,
}

impl From<TraceArg> for TraceFormat {
    fn from(arg: TraceArg) -> Self {
        match arg {
            TraceArg::Binary => Self::Binary,
            TraceArg::Text => Self::Text,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let config = build_config(&cli);
    let verbose = config.as_ref().map_or(cli.verbose, |c| c.general.verbose);
    init_logging(verbose);

    let code = match config.and_then(|config| run(config, &cli.program)) {
        Ok(report) => {
            if let Some(msg) = halt_diagnostic(&report) {
                eprintln!("{msg}");
            }
            if verbose {
                print_report(&report);
            }
            report.exit_code
        }
        Err(msg) => {
            eprintln!("error: {msg}");
            if verbose {
                println!("Exit code: {EXIT_FAILURE}");
            }
            EXIT_FAILURE
        }
    };
    process::exit(code);
}

/// Installs the stderr subscriber: `warn` by default, `info` when verbose, `RUST_LOG` wins.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(config: Config, program: &Path) -> Result<RunReport, String> {
    let video_enabled = config.video.enabled;
    let mut display = HeadlessDisplay::from_config(&config.video);

    let sim = Simulator::new(config).map_err(|e| e.to_string())?;
    let image = sim.load_program(program).map_err(|e| e.to_string())?;
    let display: Option<&mut dyn Display> = if video_enabled {
        Some(&mut display)
    } else {
        None
    };
    sim.run(&image, display).map_err(|e| e.to_string())
}

/// Resolves the configuration: file (or defaults), then command-line overrides.
fn build_config(cli: &Cli) -> Result<Config, String> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };

    config.general.verbose |= cli.verbose;
    if let Some(cycles) = cli.cycles {
        config.general.max_cycles = Some(cycles);
    }
    if let Some(size) = cli.ram_size {
        config.memory.ram_size = size;
    }
    if let Some(addr) = cli.addr {
        config.memory.load_addr = Some(addr);
    }

    config.video.enabled |= cli.gfx;
    if let Some(addr) = cli.gfx_addr {
        config.video.addr = addr;
    }
    if let Some(width) = cli.gfx_width {
        config.video.width = width;
    }
    if let Some(height) = cli.gfx_height {
        config.video.height = height;
    }
    if let Some(depth) = cli.gfx_depth {
        config.video.depth = depth;
    }
    if cli.gfx_snapshot.is_some() {
        config.video.snapshot.clone_from(&cli.gfx_snapshot);
    }

    if cli.trace.is_some() {
        config.trace.path.clone_from(&cli.trace);
        config.trace.format = cli.trace_format.into();
    }

    if let Some(path) = &cli.dump {
        config.dump = Some(DumpConfig {
            begin: cli.dump_begin,
            end: cli.dump_end,
            ..DumpConfig::vram(path)
        });
    }

    Ok(config)
}

/// The stderr line for a halt other than a normal program exit.
fn halt_diagnostic(report: &RunReport) -> Option<String> {
    match report.reason {
        Some(reason) if reason.is_normal() => None,
        Some(reason) => Some(format!("error: {reason}")),
        None => Some("error: cpu task panicked".to_string()),
    }
}

fn print_report(report: &RunReport) {
    match report.reason {
        Some(reason) => println!("Exit code: {} ({reason})", report.exit_code),
        None => println!("Exit code: {} (cpu task panicked)", report.exit_code),
    }
    if let Some(cpu) = report.cpu.as_deref() {
        if !report.reason.is_some_and(|r| r.is_normal()) {
            cpu.dump_state();
        }
        cpu.stats().print();
    }
}

/// Parses an unsigned number written in decimal, `0x` hex or `0b` binary.
fn parse_num(s: &str) -> Result<u64, String> {
    let t = s.trim().replace('_', "");
    let (digits, radix) = if let Some(h) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        (h, 16)
    } else if let Some(b) = t.strip_prefix("0b").or_else(|| t.strip_prefix("0B")) {
        (b, 2)
    } else {
        (t.as_str(), 10)
    };
    u64::from_str_radix(digits, radix).map_err(|e| format!("invalid number '{s}': {e}"))
}

fn parse_u64(s: &str) -> Result<u64, String> {
    parse_num(s)
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let v = parse_num(s)?;
    u32::try_from(v).map_err(|_| format!("'{s}' does not fit in 32 bits"))
}
