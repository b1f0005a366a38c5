//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Output rehash CLI
///
/// Recomputes content hashes for emitted build artifacts and propagates
/// renames into index artifacts.
#[derive(Parser, Debug)]
#[command(name = "outhash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rehash artifacts in an output directory and propagate renames
    Run(RunCommand),

    /// Verify emitted file names against their content hashes
    Verify(VerifyCommand),

    /// Run diagnostics
    Doctor,

    /// Print version
    Version,
}

#[derive(Args, Debug)]
pub struct RunCommand {
    /// Directory containing the emitted build outputs
    pub dir: PathBuf,

    /// Designate an additional index artifact by stable name (repeatable)
    #[arg(long = "index", value_name = "NAME")]
    pub index_artifacts: Vec<String>,

    /// Validate emitted output after rewriting
    #[arg(long)]
    pub validate: bool,

    /// Show planned renames without writing files
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct VerifyCommand {
    /// Directory containing the emitted build outputs
    pub dir: PathBuf,

    /// Glob-style file name pattern to check (defaults to the configured
    /// validation pattern)
    #[arg(long, value_name = "PATTERN")]
    pub pattern: Option<String>,
}
