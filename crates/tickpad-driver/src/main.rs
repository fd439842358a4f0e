mod config;
mod haptics;
mod script;

use clap::Parser;
use log::info;
use std::path::PathBuf;
use tickpad_core::registers::{DIV, IF, RegisterFile, TAC, TIMA, TMA};

use crate::script::{Runner, Script, ScriptError};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a TOML event script
    #[arg(required_unless_present = "save_config")]
    script: Option<PathBuf>,

    /// Driver config file (defaults to the per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cycles per simulated instruction, overriding script and config
    #[arg(long)]
    step: Option<u16>,

    /// Log a haptic pulse on every button press
    #[arg(long)]
    haptics: bool,

    /// Start from a snapshot written by --dump-state
    #[arg(long)]
    load_state: Option<PathBuf>,

    /// Write the final register/timer/button state here
    #[arg(long)]
    dump_state: Option<PathBuf>,

    /// Write the effective config to the config path and exit
    #[arg(long)]
    save_config: bool,
}

fn run(args: &Args) -> Result<(), ScriptError> {
    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let mut cfg = config::load_from_file(&config_path);
    if let Some(step) = args.step {
        cfg.step_cycles = step;
    }
    cfg.haptics |= args.haptics;

    if args.save_config {
        config::save_to_file(&config_path, &cfg)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let Some(script_path) = &args.script else {
        return Ok(());
    };
    let script = Script::load(script_path)?;
    let step = args.step.or(script.step).unwrap_or(cfg.step_cycles);
    info!(
        "Running {} ({} events, {step} cycles per step)",
        script_path.display(),
        script.events.len()
    );

    let mut runner = Runner::new(step);
    if cfg.haptics {
        runner = runner.with_haptics(Box::new(haptics::LogHaptics));
    }
    if let Some(path) = &args.load_state {
        runner.restore(&script::load_snapshot(path)?)?;
    }

    for read in runner.run(&script) {
        println!("[{:>8}] {:04X} -> {:02X}", read.cycle, read.addr, read.value);
    }

    let io = &runner.mmu.io;
    println!(
        "cycles={} DIV={:02X} TIMA={:02X} TMA={:02X} TAC={:02X} IF={:02X}",
        runner.clock(),
        io.get(DIV),
        io.get(TIMA),
        io.get(TMA),
        io.get(TAC),
        io.get(IF)
    );

    if let Some(path) = &args.dump_state {
        script::save_snapshot(path, &runner.mmu.snapshot())?;
        info!("Saved state to {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
