//! Synchronous staged pipeline.
//!
//! The host build exposes an ordered sequence of named stages; the rehash
//! pass registers into the phases it needs and the host owns the rest. Every
//! stage is synchronous and runs to completion; the first stage error aborts
//! the run.
//!
//! # Phases
//!
//! - `Collect`: the host populates the artifact repository
//! - `Optimize`: this pass rehashes, renames, and rewrites references
//! - `Emit`: the host writes artifacts to their final location
//! - `AfterEmit`: this pass optionally validates what was shipped
//!
//! # Example
//!
//! ```rust
//! use outhash_core::{
//!     HashConfig, OutputRehash, Phase, Pipeline, PipelineContext, RehashConfig,
//! };
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.register_fn("collect-artifacts", Phase::Collect, |ctx| {
//!     // host loads artifacts into ctx.repository here
//!     let _ = &ctx.repository;
//!     Ok(())
//! });
//!
//! let rehash = OutputRehash::new(RehashConfig::default(), HashConfig::default())?;
//! rehash.register(&mut pipeline);
//!
//! let mut ctx = PipelineContext::new();
//! pipeline.run(&mut ctx)?;
//! # Ok::<(), outhash_core::Error>(())
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::RehashConfig;
use crate::error::{Error, Result};
use crate::hash::{HashConfig, Hasher};
use crate::renamer::{rehash_artifacts, RenameMap};
use crate::repository::ArtifactRepository;
use crate::validate::{ensure_valid_output, validate_output, ValidationReport};

/// Phase at which a stage executes. Phases run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// The artifact collection is captured before it disappears from later
    /// build context
    Collect,
    /// Artifacts are renamed and rewritten in place
    Optimize,
    /// Artifacts are written to their final location
    Emit,
    /// Emitted output is inspected
    AfterEmit,
}

impl Phase {
    const ORDER: [Phase; 4] = [Phase::Collect, Phase::Optimize, Phase::Emit, Phase::AfterEmit];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Collect => write!(f, "collect"),
            Phase::Optimize => write!(f, "optimize"),
            Phase::Emit => write!(f, "emit"),
            Phase::AfterEmit => write!(f, "after-emit"),
        }
    }
}

/// Shared state threaded through the stages of one run
#[derive(Debug, Default)]
pub struct PipelineContext {
    /// The artifact collection this run operates on
    pub repository: ArtifactRepository,
    /// Where artifacts are emitted; required by the validation stage
    pub output_dir: Option<PathBuf>,
    /// The rename map produced by the optimize stage, once it has run
    pub rename_map: Option<RenameMap>,
}

impl PipelineContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the emission directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

/// A named unit of work attached to one phase
pub trait Stage {
    /// Name of the stage (for logging/diagnostics)
    fn name(&self) -> &str;

    /// Phase at which this stage executes
    fn phase(&self) -> Phase;

    /// Execute the stage
    fn run(&self, ctx: &mut PipelineContext) -> Result<()>;
}

/// An ordered sequence of named stages.
///
/// Stages execute grouped by phase, in registration order within a phase.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage
    pub fn register(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    /// Register a stage from a closure
    pub fn register_fn(
        &mut self,
        name: impl Into<String>,
        phase: Phase,
        run: impl Fn(&mut PipelineContext) -> Result<()> + 'static,
    ) {
        self.register(Box::new(FnStage {
            name: name.into(),
            phase,
            run,
        }));
    }

    /// Names of the registered stages, in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        Phase::ORDER
            .iter()
            .flat_map(|phase| {
                self.stages
                    .iter()
                    .filter(move |s| s.phase() == *phase)
                    .map(|s| s.name())
            })
            .collect()
    }

    /// Run every stage to completion, aborting on the first error
    pub fn run(&self, ctx: &mut PipelineContext) -> Result<()> {
        for phase in Phase::ORDER {
            for stage in self.stages.iter().filter(|s| s.phase() == phase) {
                debug!("Running stage {} ({})", stage.name(), phase);
                stage.run(ctx)?;
            }
        }
        Ok(())
    }
}

struct FnStage<F> {
    name: String,
    phase: Phase,
    run: F,
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&mut PipelineContext) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<()> {
        (self.run)(ctx)
    }
}

/// The rehash pass, packaged for registration into a host pipeline.
///
/// Registers an optimize stage that rehashes ordinary artifacts, rewrites
/// index artifact references, and rehashes the index artifacts on their
/// updated content; and, when validation is enabled, an after-emit stage that
/// checks shipped file names against their content hashes. Both operations
/// are also directly invocable without a pipeline.
pub struct OutputRehash {
    config: RehashConfig,
    hasher: Hasher,
}

impl OutputRehash {
    /// Create the pass, validating the hashing parameters
    pub fn new(config: RehashConfig, hash_config: HashConfig) -> Result<Self> {
        Ok(Self {
            config,
            hasher: Hasher::new(hash_config)?,
        })
    }

    /// The hasher this pass uses
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// Rehash and rewrite the repository, returning the rename map
    pub fn optimize(&self, repository: &mut ArtifactRepository) -> Result<RenameMap> {
        rehash_artifacts(repository, &self.config.index_artifacts, &self.hasher)
    }

    /// Validate emitted files in `dir` against the configured pattern
    pub fn validate(&self, dir: &Path) -> Result<ValidationReport> {
        validate_output(dir, &self.config.validate_pattern, &self.hasher)
    }

    /// Register this pass's stages into a host pipeline
    pub fn register(self, pipeline: &mut Pipeline) {
        let pass = Arc::new(self);
        let validate = pass.config.validate_output;

        pipeline.register(Box::new(OptimizeStage {
            pass: Arc::clone(&pass),
        }));
        if validate {
            pipeline.register(Box::new(ValidateStage { pass }));
        }
    }
}

struct OptimizeStage {
    pass: Arc<OutputRehash>,
}

impl Stage for OptimizeStage {
    fn name(&self) -> &str {
        "rehash-artifacts"
    }

    fn phase(&self) -> Phase {
        Phase::Optimize
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<()> {
        let rename_map = self.pass.optimize(&mut ctx.repository)?;
        ctx.rename_map = Some(rename_map);
        Ok(())
    }
}

struct ValidateStage {
    pass: Arc<OutputRehash>,
}

impl Stage for ValidateStage {
    fn name(&self) -> &str {
        "validate-output"
    }

    fn phase(&self) -> Phase {
        Phase::AfterEmit
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<()> {
        let dir = ctx.output_dir.as_deref().ok_or(Error::MissingOutputDir)?;
        ensure_valid_output(dir, &self.pass.config.validate_pattern, &self.pass.hasher)?;
        Ok(())
    }
}
