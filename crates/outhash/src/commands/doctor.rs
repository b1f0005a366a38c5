//! Diagnostics command.

use anyhow::{bail, Result};
use colored::Colorize;

use outhash_core::Hasher;

use crate::config::Config;

pub fn execute(config: &Config) -> Result<()> {
    println!("{}", "outhash Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check config file
    print!("  Config file: ");
    let config_path = Config::config_path();
    if config_path.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ not found (using defaults)".yellow());
    }

    // Check hash settings
    print!("  Hash settings: ");
    match config.hash_config().and_then(|c| Ok(Hasher::new(c)?)) {
        Ok(_) => {
            let summary = format!(
                "✓ {}/{} length {}",
                config.hash.algorithm, config.hash.encoding, config.hash.digest_length
            );
            println!("{}", summary.green());
        }
        Err(e) => {
            println!("{}", format!("✗ {e}").red());
            issues.push("hash settings are invalid");
        }
    }

    // Check index designation
    print!("  Index artifacts: ");
    if config.rehash.index_artifacts.is_empty() {
        println!("{}", "○ none designated".yellow());
    } else {
        let names = config.rehash.index_artifacts.join(", ");
        println!("{}", format!("✓ {names}").green());
    }

    // Check validation settings
    print!("  Output validation: ");
    if config.rehash.validate_output {
        let pattern = &config.rehash.validate_pattern;
        println!("{}", format!("✓ enabled ({pattern})").green());
    } else {
        println!("{}", "○ disabled".yellow());
    }

    println!();
    if issues.is_empty() {
        println!("{}", "No issues found".green());
        Ok(())
    } else {
        for issue in &issues {
            println!("{} {}", "✗".red(), issue);
        }
        bail!("{} issue(s) found", issues.len());
    }
}
