use anyhow::{Context, Result};
use clap::Parser;
use lc3_vm::emulator::Emulator;
use lc3_vm::terminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Run LC-3 machine-code images on the lc3-vm interpreter.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Opts {
    /// Image files, loaded in order. Later images overwrite earlier ones in
    /// overlapping regions.
    #[arg(value_name = "IMAGE-FILE", required = true)]
    images: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let mut emu = Emulator::new();
    for image in &opts.images {
        emu.load_image(image)
            .with_context(|| format!("Failed to load image: {}", image.display()))?;
    }

    // raw mode for the whole run, the lock restores the terminal on every
    // exit path including CTRL-C surfacing as ExecutionError::Interrupted
    let _raw_lock = terminal::set_terminal_raw(std::io::stdout());
    emu.execute()?;
    Ok(())
}
