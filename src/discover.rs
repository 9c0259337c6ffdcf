// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Artifact discovery.
//!
//! Locate build artifacts below a workspace root through a glob pattern. The
//! default pattern `**/*.war` picks up every WAR file anywhere inside the
//! workspace, including the workspace root itself.
//!
//! Discovery is kept separate from aliasing. The aliaser works on whatever
//! list of artifacts it is handed, no matter where that list came from.

use crate::alias::{name::Artifact, AliasError};

use glob::{glob_with, MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Default artifact pattern.
pub const DEFAULT_PATTERN: &str = "**/*.war";

/// Find artifacts in workspace through glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    root: PathBuf,
    pattern: String,
}

impl Discovery {
    /// Construct new discovery over workspace root.
    ///
    /// Pattern is interpreted relative to the workspace root.
    pub fn new(root: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            pattern: pattern.into(),
        }
    }

    /// Workspace root being searched.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// List all regular files matching pattern.
    ///
    /// Results are sorted by path so that artifacts are always processed in
    /// the same order for the same workspace.
    ///
    /// # Errors
    ///
    /// - Return [`DiscoverError::Pattern`] if pattern is invalid.
    /// - Return [`DiscoverError::Walk`] if a matching entry cannot be read.
    #[instrument(skip(self), fields(root = %self.root.display(), pattern = %self.pattern), level = "debug")]
    pub fn find(&self) -> Result<Vec<Artifact>> {
        // INVARIANT: Glob metacharacters in the workspace path match literally.
        let root = Pattern::escape(self.root.to_string_lossy().as_ref());
        let full = Path::new(&root).join(&self.pattern);
        let full = full.to_string_lossy();

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        let entries = glob_with(full.as_ref(), options).map_err(|err| DiscoverError::Pattern {
            source: err,
            pattern: self.pattern.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?;
            if path.is_file() {
                paths.push(path);
            } else {
                debug!("skip non-file match {:?}", path.display());
            }
        }
        paths.sort();

        let artifacts = paths
            .into_iter()
            .map(Artifact::new)
            .collect::<Result<Vec<_>, AliasError>>()?;
        debug!("found {} artifacts", artifacts.len());

        Ok(artifacts)
    }
}

impl Default for Discovery {
    fn default() -> Self {
        Self::new(".", DEFAULT_PATTERN)
    }
}

/// Artifact discovery error types.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// Glob pattern cannot be compiled.
    #[error("invalid artifact pattern {pattern:?}")]
    Pattern {
        #[source]
        source: glob::PatternError,
        pattern: String,
    },

    /// Matching entry cannot be read.
    #[error(transparent)]
    Walk(#[from] glob::GlobError),

    /// Matching entry cannot be treated as an artifact.
    #[error(transparent)]
    Artifact(#[from] AliasError),
}

/// Friendly result alias :3
pub type Result<T, E = DiscoverError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs;

    fn names(artifacts: &[Artifact]) -> Vec<PathBuf> {
        artifacts.iter().map(|artifact| artifact.as_path().to_path_buf()).collect()
    }

    #[sealed_test]
    fn find_wars_recursively_in_order() -> anyhow::Result<()> {
        fs::create_dir_all("ws/module/target")?;
        fs::create_dir_all("ws/other.war")?;
        fs::write("ws/root.war", "")?;
        fs::write("ws/module/target/app.war", "")?;
        fs::write("ws/module/target/app.jar", "")?;
        fs::write("ws/module/a.war", "")?;

        let result = Discovery::new("ws", DEFAULT_PATTERN).find()?;
        let expect = vec![
            PathBuf::from("ws/module/a.war"),
            PathBuf::from("ws/module/target/app.war"),
            PathBuf::from("ws/root.war"),
        ];
        assert_eq!(names(&result), expect);

        Ok(())
    }

    #[sealed_test]
    fn find_escapes_workspace_metacharacters() -> anyhow::Result<()> {
        fs::create_dir_all("job[1]")?;
        fs::write("job[1]/app.war", "")?;

        let result = Discovery::new("job[1]", DEFAULT_PATTERN).find()?;
        assert_eq!(names(&result), vec![PathBuf::from("job[1]/app.war")]);

        Ok(())
    }

    #[sealed_test]
    fn find_nothing_in_empty_workspace() -> anyhow::Result<()> {
        assert!(Discovery::default().find()?.is_empty());

        Ok(())
    }

    #[cfg(unix)]
    #[sealed_test]
    fn find_fails_on_unreadable_directory() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        fs::create_dir_all("ws/locked")?;
        fs::write("ws/app.war", "")?;
        fs::set_permissions("ws/locked", fs::Permissions::from_mode(0o000))?;

        // Privileged users read through any permission bits.
        if fs::read_dir("ws/locked").is_ok() {
            fs::set_permissions("ws/locked", fs::Permissions::from_mode(0o755))?;
            return Ok(());
        }

        let result = Discovery::new("ws", DEFAULT_PATTERN).find();
        fs::set_permissions("ws/locked", fs::Permissions::from_mode(0o755))?;
        assert!(matches!(result, Err(DiscoverError::Walk(_))));

        Ok(())
    }

    #[test]
    fn find_rejects_invalid_pattern() {
        let result = Discovery::new(".", "***/*.war").find();
        assert!(matches!(result, Err(DiscoverError::Pattern { .. })));
    }
}
