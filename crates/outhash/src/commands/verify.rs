//! Standalone output validation command.

use anyhow::{bail, Result};
use colored::Colorize;

use outhash_core::{validate_output, Hasher};

use crate::cli::VerifyCommand;
use crate::config::Config;

pub fn execute(cmd: VerifyCommand, config: &Config) -> Result<()> {
    let hasher = Hasher::new(config.hash_config()?)?;
    let pattern = cmd
        .pattern
        .unwrap_or_else(|| config.rehash.validate_pattern.clone());

    let report = validate_output(&cmd.dir, &pattern, &hasher)?;
    println!(
        "Checked {} file(s) matching {} in {}",
        report.checked,
        pattern,
        cmd.dir.display()
    );

    if report.is_pass() {
        println!("{} All file names match their content hashes", "✓".green());
        Ok(())
    } else {
        for mismatch in &report.mismatches {
            println!("  {} {}", "✗".red(), mismatch);
        }
        bail!(
            "{} of {} checked file(s) failed validation",
            report.mismatches.len(),
            report.checked
        );
    }
}
