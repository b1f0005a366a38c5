//! Rehash command: collect, optimize, emit, optionally validate.
//!
//! The command plays the host pipeline around the core pass: it registers a
//! collect stage that loads hash-named files from the output directory and an
//! emit stage that writes renamed artifacts back and removes the stale
//! originals. The core registers its own optimize and after-emit stages.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::{debug, info};

use outhash_core::{
    Artifact, ArtifactContent, OutputRehash, Phase, Pipeline, PipelineContext,
};

use crate::cli::RunCommand;
use crate::config::Config;
use crate::scan;

pub fn execute(cmd: RunCommand, config: &Config) -> Result<()> {
    let hash_config = config.hash_config()?;
    let mut rehash_config = config.rehash_config();
    for name in &cmd.index_artifacts {
        rehash_config.index_artifacts.insert(name.clone());
    }
    if cmd.validate {
        rehash_config.validate_output = true;
    }
    if cmd.dry_run {
        // Nothing is emitted, so there is nothing to validate
        rehash_config.validate_output = false;
    }
    let validate_output = rehash_config.validate_output;

    let dir = cmd.dir;
    if !dir.is_dir() {
        bail!("Output directory {} does not exist", dir.display());
    }

    let digest_length = hash_config.digest_length;
    let encoding = hash_config.encoding;
    let index_names = rehash_config.index_artifacts.clone();

    let mut pipeline = Pipeline::new();
    let originals: Rc<RefCell<Vec<String>>> = Rc::default();

    // Collect: load hash-named files. Index artifacts are loaded as text so
    // their references can be rewritten; everything else stays raw bytes.
    {
        let originals = Rc::clone(&originals);
        let dir = dir.clone();
        pipeline.register_fn("collect-artifacts", Phase::Collect, move |ctx| {
            let mut file_names = Vec::new();
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    file_names.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
            file_names.sort();

            for file_name in file_names {
                let Some(parsed) = scan::split_hashed_name(&file_name, digest_length, encoding)
                else {
                    debug!("Skipping {} (no hash fragment)", file_name);
                    continue;
                };

                let bytes = fs::read(dir.join(&file_name))?;
                let content = if index_names.contains(&parsed.stable_name) {
                    match String::from_utf8(bytes) {
                        Ok(text) => ArtifactContent::Text(text),
                        // Non-UTF-8 index content stays binary; the rewriter
                        // rejects it rather than rewriting blind
                        Err(raw) => ArtifactContent::Binary(raw.into_bytes()),
                    }
                } else {
                    ArtifactContent::Binary(bytes)
                };

                originals.borrow_mut().push(file_name.clone());
                ctx.repository.insert(Artifact::with_content(
                    file_name,
                    parsed.stable_name,
                    parsed.fragment,
                    content,
                ))?;
            }

            info!("Collected {} artifact(s)", ctx.repository.len());
            Ok(())
        });
    }

    OutputRehash::new(rehash_config, hash_config)?.register(&mut pipeline);

    // Emit: write every artifact under its final name, then drop originals
    // that are no longer live.
    if !cmd.dry_run {
        let originals = Rc::clone(&originals);
        let dir = dir.clone();
        pipeline.register_fn("emit-artifacts", Phase::Emit, move |ctx| {
            for (name, artifact) in ctx.repository.iter() {
                fs::write(dir.join(name), artifact.content_bytes())?;
            }
            for old_name in originals.borrow().iter() {
                if !ctx.repository.contains(old_name) {
                    fs::remove_file(dir.join(old_name))?;
                }
            }
            Ok(())
        });
    }

    let mut ctx = PipelineContext::new().with_output_dir(dir);
    pipeline
        .run(&mut ctx)
        .context("Rehash pass failed")?;

    let rename_map = ctx.rename_map.unwrap_or_default();
    for record in rename_map.iter() {
        println!(
            "  {} -> {}",
            record.old_fragment.yellow(),
            record.new_fragment.green()
        );
    }
    println!(
        "{} Rehashed {} artifact(s) ({} renamed)",
        "✓".green(),
        ctx.repository.len(),
        rename_map.len()
    );
    if cmd.dry_run {
        println!("{}", "Dry run: no files were written".yellow());
    } else if validate_output {
        println!("{} Output validated", "✓".green());
    }

    Ok(())
}
