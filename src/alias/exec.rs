// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Alias task execution.
//!
//! The filesystem work for one artifact is packaged as an [`AliasTask`]. A
//! task only holds its inputs, so it can be handed to whatever context owns
//! the artifact's storage, e.g., a build agent on another machine. Tasks are
//! dispatched through the [`Executor`] trait. Dispatch is always synchronous:
//! the caller regains control only after the task ran to completion.

use crate::{
    alias::{
        name::{derive_alias_path, Artifact, BuildNumber},
        AliasError, OutputMode, Result,
    },
    progress::ProgressSink,
};

use std::{fs, path::PathBuf};
use tracing::{debug, instrument};

/// Run alias tasks in some execution context.
pub trait Executor {
    /// Execute task to completion.
    ///
    /// Progress lines produced by the task are written to `sink` before the
    /// filesystem is touched.
    fn execute(&self, task: &AliasTask, sink: &mut dyn ProgressSink) -> Result<TaskOutcome>;
}

impl<E> Executor for &E
where
    E: Executor + ?Sized,
{
    fn execute(&self, task: &AliasTask, sink: &mut dyn ProgressSink) -> Result<TaskOutcome> {
        (**self).execute(task, sink)
    }
}

/// Execute alias tasks in the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalExecutor;

impl Executor for LocalExecutor {
    fn execute(&self, task: &AliasTask, sink: &mut dyn ProgressSink) -> Result<TaskOutcome> {
        task.invoke(sink)
    }
}

/// Unit of work aliasing a single artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTask {
    artifact: Artifact,
    build: BuildNumber,
    mode: OutputMode,
}

impl AliasTask {
    /// Construct new alias task.
    pub fn new(artifact: Artifact, build: BuildNumber, mode: OutputMode) -> Self {
        Self {
            artifact,
            build,
            mode,
        }
    }

    /// Artifact targeted by task.
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Perform guard check, alias derivation, reporting, and link-or-rename.
    ///
    /// Artifacts that already carry the alias marker are skipped without
    /// reporting anything to `sink`.
    ///
    /// # Errors
    ///
    /// - Return [`AliasError::Create`] if the hard link or rename fails. Hard
    ///   link mode never overwrites an existing alias, rename mode always does.
    #[instrument(skip(self, sink), fields(artifact = %self.artifact.as_path().display()), level = "debug")]
    pub fn invoke(&self, sink: &mut dyn ProgressSink) -> Result<TaskOutcome> {
        // INVARIANT: Never alias an alias.
        if self.artifact.is_alias() {
            debug!("artifact already carries alias marker");
            return Ok(TaskOutcome::Skipped);
        }

        let alias = derive_alias_path(&self.artifact, self.build);
        let alias_name = alias
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        sink.line(&format!(
            "Create link {alias_name} to {}",
            self.artifact.display_name()
        ));

        let source = self.artifact.as_path();
        let result = match self.mode {
            OutputMode::Hardlink => fs::hard_link(source, &alias),
            OutputMode::Rename => fs::rename(source, &alias),
        };
        result.map_err(|err| AliasError::Create {
            mode: self.mode,
            source: err,
            artifact: source.to_path_buf(),
            alias: alias.clone(),
        })?;
        debug!("created {} alias {:?}", self.mode, alias.display());

        Ok(TaskOutcome::Aliased { alias })
    }
}

/// Result of a completed alias task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Artifact already was an alias.
    Skipped,

    /// Alias created at given path.
    Aliased { alias: PathBuf },
}
