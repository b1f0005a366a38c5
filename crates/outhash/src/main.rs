//! outhash - Output rehash CLI
//!
//! Recomputes content hashes for emitted build artifacts, renames the files
//! to embed the fresh hash, and propagates renames into index artifacts that
//! reference them.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;
mod scan;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("outhash=info".parse()?))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::load()?;

    // Execute command
    match cli.command {
        Commands::Run(cmd) => commands::run::execute(cmd, &config),
        Commands::Verify(cmd) => commands::verify::execute(cmd, &config),
        Commands::Doctor => commands::doctor::execute(&config),
        Commands::Version => {
            println!("outhash {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
