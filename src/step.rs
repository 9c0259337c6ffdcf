// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Numbering build step.
//!
//! The numbering step is what a build runs once its artifacts exist. It
//! discovers artifacts in the workspace, aliases each one of them, and folds
//! every error into log output instead of handing it back to the caller.
//!
//! # Failure Reporting
//!
//! By default a numbering step _always_ reports success, even after logging
//! an error. A broken alias is not treated as a broken build. Jobs that want
//! logged errors to fail the build must opt in through
//! [`FailurePolicy::Propagate`].
//!
//! Errors are reported on two streams:
//!
//! 1. __Progress__: a one line summary for I/O failures, written to the same
//!    sink that receives the regular progress lines.
//! 2. __Diagnostic__: the full error with its chain of causes, logged through
//!    [`tracing`] at error level. Interruptions only show up here.

use crate::{
    alias::{
        exec::{Executor, LocalExecutor},
        name::BuildNumber,
        AliasError, AliasSummary, Aliaser, Interrupt,
    },
    config::{FailurePolicy, JobSettings},
    discover::{DiscoverError, Discovery},
    progress::ProgressSink,
};

use std::path::Path;
use tracing::{error, info, instrument};

/// Build step creating numbered aliases for workspace artifacts.
#[derive(Debug)]
pub struct NumberingStep<E = LocalExecutor>
where
    E: Executor,
{
    settings: JobSettings,
    executor: E,
}

impl NumberingStep<LocalExecutor> {
    /// Construct new numbering step running in current process.
    pub fn new(settings: JobSettings) -> Self {
        Self::with_executor(settings, LocalExecutor)
    }
}

impl<E> NumberingStep<E>
where
    E: Executor,
{
    /// Construct new numbering step over target execution context.
    pub fn with_executor(settings: JobSettings, executor: E) -> Self {
        Self { settings, executor }
    }

    /// Settings used by step.
    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    /// Run step, reporting overall outcome to caller.
    ///
    /// Returns `true` unless an error was logged and the failure policy is
    /// [`FailurePolicy::Propagate`].
    pub fn perform(
        &self,
        workspace: &Path,
        build: BuildNumber,
        sink: &mut dyn ProgressSink,
        interrupt: &Interrupt,
    ) -> bool {
        let error = match self.try_perform(workspace, build, sink, interrupt) {
            Ok(_) => return true,
            Err(error) => error,
        };

        let is_io = error.is_io();
        let report = anyhow::Error::new(error);
        if is_io {
            sink.line(&format!("ERROR: {report:#}"));
        }
        error!("{report:?}");

        match self.settings.failure_policy {
            FailurePolicy::Report => true,
            FailurePolicy::Propagate => false,
        }
    }

    /// Run step, handing errors back to caller.
    ///
    /// # Errors
    ///
    /// - Return [`StepError::Enumeration`] if artifact discovery fails.
    /// - Return [`StepError::Alias`] if aliasing fails or gets interrupted.
    #[instrument(skip(self, sink, interrupt), fields(workspace = %workspace.display()), level = "debug")]
    pub fn try_perform(
        &self,
        workspace: &Path,
        build: BuildNumber,
        sink: &mut dyn ProgressSink,
        interrupt: &Interrupt,
    ) -> Result<AliasSummary> {
        info!(
            "number artifacts matching {:?} for build {build}",
            self.settings.pattern
        );
        let artifacts = Discovery::new(workspace, self.settings.pattern.as_str()).find()?;
        let aliaser = Aliaser::with_executor(build, self.settings.mode, &self.executor)
            .with_interrupt(interrupt.clone());

        Ok(aliaser.alias(artifacts, sink)?)
    }
}

/// Numbering step error types.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// Artifact discovery fails.
    #[error("failed to enumerate artifacts")]
    Enumeration(#[from] DiscoverError),

    /// Aliasing fails.
    #[error(transparent)]
    Alias(#[from] AliasError),
}

impl StepError {
    /// Check if error stems from the filesystem rather than the host.
    pub fn is_io(&self) -> bool {
        !matches!(self, Self::Alias(AliasError::Interrupted))
    }
}

/// Friendly result alias :3
pub type Result<T, E = StepError> = std::result::Result<T, E>;
