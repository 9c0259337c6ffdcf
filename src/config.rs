// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout for the job definition file that warnum uses to simplify
//! the process of serialization and deserialization. File I/O is left to the
//! caller to figure out.

use crate::{alias::OutputMode, discover::DEFAULT_PATTERN};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Job definition layout.
///
/// A job definition holds the settings of a numbering job that remain the
/// same from one build to the next. The build number itself is never part of
/// the definition, because it changes with every build.
///
/// # General Layout
///
/// ```toml
/// [settings]
/// pattern = "**/*.war"
/// mode = "hardlink"
/// failure_policy = "report"
/// workspace = "$HOME/builds/app"
/// ```
///
/// Every field is optional. Missing fields fall back to their defaults.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct JobDefinition {
    /// Settings for the job.
    #[serde(default)]
    pub settings: JobSettings,
}

impl FromStr for JobDefinition {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut definition: JobDefinition =
            toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on workspace field.
        if let Some(workspace) = definition.settings.workspace.take() {
            definition.settings.workspace = Some(Workspace::new(
                shellexpand::full(workspace.to_string().as_str())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            ));
        }

        Ok(definition)
    }
}

impl Display for JobDefinition {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Job configuration settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JobSettings {
    /// Glob pattern selecting artifacts relative to workspace.
    pub pattern: String,

    /// How aliases are materialized.
    pub mode: OutputMode,

    /// Whether logged failures still count as success.
    pub failure_policy: FailurePolicy,

    /// Workspace to search for artifacts, current directory if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<Workspace>,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.into(),
            mode: OutputMode::default(),
            failure_policy: FailurePolicy::default(),
            workspace: None,
        }
    }
}

/// Outcome reported to the caller when a numbering step logs an error.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the error, report success anyway.
    #[default]
    Report,

    /// Log the error, report failure.
    Propagate,
}

/// Path of workspace containing build artifacts.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Workspace(PathBuf);

impl Workspace {
    /// Construct new workspace.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Treat workspace as [`Path`] slice.
    pub fn as_path(&self) -> &Path {
        self.0.as_path()
    }
}

impl Display for Workspace {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_path().to_string_lossy().as_ref())
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
