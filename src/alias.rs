// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Build-numbered artifact aliases.
//!
//! An __alias__ is an additional name for a build artifact that embeds the
//! number of the build that produced it, e.g., `app.war` gains the alias
//! `app##42.war` in build 42. Keeping the unaliased name around lets
//! downstream tooling always pick up the latest artifact, while the numbered
//! alias keeps a stable handle on a specific build.
//!
//! # Output Modes
//!
//! Aliases are materialized in one of two ways:
//!
//! 1. __Hard link__: the alias is a second directory entry for the artifact's
//!    data. The original name stays in place. Creating a hard link never
//!    overwrites an existing file, so rerunning the same build number fails.
//! 2. __Rename__: the artifact is moved to its alias name. Any file already
//!    sitting at the alias name is replaced, so reruns of the same build
//!    number always succeed.
//!
//! # Batches
//!
//! [`Aliaser::alias`] walks a batch of artifacts strictly in order. The first
//! failure aborts the batch. Aliases created before the failure are left in
//! place.
//!
//! # See Also
//!
//! 1. [`name`] for alias name derivation.
//! 2. [`exec`] for task execution contexts.

pub mod exec;
pub mod name;

use crate::{
    alias::{
        exec::{AliasTask, Executor, LocalExecutor, TaskOutcome},
        name::{Artifact, BuildNumber},
    },
    progress::ProgressSink,
};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tracing::{debug, info, instrument, warn};

/// How aliases get materialized on the filesystem.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Create hard link at alias path, keep original artifact.
    #[default]
    Hardlink,

    /// Move artifact to alias path, replacing anything already there.
    Rename,
}

impl OutputMode {
    /// Select output mode from boolean rename flag.
    pub fn from_rename_flag(rename: bool) -> Self {
        if rename {
            Self::Rename
        } else {
            Self::Hardlink
        }
    }

    /// Check if output mode renames artifacts.
    pub fn is_rename(&self) -> bool {
        matches!(self, Self::Rename)
    }
}

impl Display for OutputMode {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Hardlink => fmt.write_str("hardlink"),
            Self::Rename => fmt.write_str("rename"),
        }
    }
}

/// Host interruption signal.
///
/// Cheap to clone. All clones observe the same signal.
#[derive(Debug, Default, Clone)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// Construct new lowered interruption signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise interruption signal.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if interruption signal was raised.
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counts of a completed alias batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AliasSummary {
    /// Number of artifacts that gained an alias.
    pub aliased: usize,

    /// Number of artifacts skipped for already being aliases.
    pub skipped: usize,
}

/// Create build-numbered aliases for batches of artifacts.
///
/// Build number and output mode are fixed for the lifetime of an aliaser,
/// and apply uniformly to every artifact it is given.
#[derive(Debug)]
pub struct Aliaser<E = LocalExecutor>
where
    E: Executor,
{
    build: BuildNumber,
    mode: OutputMode,
    executor: E,
    interrupt: Interrupt,
}

impl Aliaser<LocalExecutor> {
    /// Construct new aliaser running tasks in current process.
    pub fn new(build: BuildNumber, mode: OutputMode) -> Self {
        Self::with_executor(build, mode, LocalExecutor)
    }
}

impl<E> Aliaser<E>
where
    E: Executor,
{
    /// Construct new aliaser over target execution context.
    pub fn with_executor(build: BuildNumber, mode: OutputMode, executor: E) -> Self {
        Self {
            build,
            mode,
            executor,
            interrupt: Interrupt::new(),
        }
    }

    /// Observe host interruption signal between artifacts.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Build number embedded into aliases.
    pub fn build(&self) -> BuildNumber {
        self.build
    }

    /// Output mode applied to each artifact.
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Alias batch of artifacts in supplied order.
    ///
    /// Writes one progress line to `sink` for each artifact that is not
    /// already an alias. Stops at the first failure without rolling back
    /// earlier aliases.
    ///
    /// # Errors
    ///
    /// - Return [`AliasError::Interrupted`] if interruption signal was raised
    ///   before an artifact got processed.
    /// - Return [`AliasError::Create`] if an alias cannot be created.
    #[instrument(skip(self, artifacts, sink), fields(build = %self.build, mode = %self.mode), level = "debug")]
    pub fn alias(
        &self,
        artifacts: impl IntoIterator<Item = Artifact>,
        sink: &mut dyn ProgressSink,
    ) -> Result<AliasSummary> {
        let mut summary = AliasSummary::default();
        for artifact in artifacts {
            if self.interrupt.is_raised() {
                warn!("interrupted before {:?}", artifact.as_path().display());
                return Err(AliasError::Interrupted);
            }

            let task = AliasTask::new(artifact, self.build, self.mode);
            match self.executor.execute(&task, sink)? {
                TaskOutcome::Skipped => summary.skipped += 1,
                TaskOutcome::Aliased { alias } => {
                    debug!("aliased {:?}", alias.display());
                    summary.aliased += 1;
                }
            }
        }

        info!(
            "build {}: {} aliased, {} skipped",
            self.build, summary.aliased, summary.skipped
        );

        Ok(summary)
    }
}

/// Alias batch of artifacts in current process.
///
/// Shorthand for [`Aliaser::new`] followed by [`Aliaser::alias`].
///
/// # Errors
///
/// - Return [`AliasError::Create`] if an alias cannot be created.
pub fn alias(
    artifacts: impl IntoIterator<Item = Artifact>,
    build: BuildNumber,
    mode: OutputMode,
    sink: &mut dyn ProgressSink,
) -> Result<AliasSummary> {
    Aliaser::new(build, mode).alias(artifacts, sink)
}

/// Alias error types.
#[derive(Debug, thiserror::Error)]
pub enum AliasError {
    /// Artifact path lacks a file name.
    #[error("artifact path {:?} has no file name", path.display())]
    InvalidArtifact { path: PathBuf },

    /// Alias could not be created.
    #[error("failed to {mode} {:?} into {:?}", artifact.display(), alias.display())]
    Create {
        mode: OutputMode,
        #[source]
        source: std::io::Error,
        artifact: PathBuf,
        alias: PathBuf,
    },

    /// Host interrupted the batch.
    #[error("aliasing interrupted")]
    Interrupted,
}

/// Friendly result alias :3
pub type Result<T, E = AliasError> = std::result::Result<T, E>;
