// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Alias name derivation.
//!
//! Every alias is named after the artifact it points to, with the build number
//! spliced in between the stem and the extension of the artifact's file name:
//!
//! ```text
//! target/app.war  ->  target/app##42.war
//! ```
//!
//! The `##` sequence used as the separator doubles as the __alias marker__.
//! Any artifact whose file name already contains the marker is assumed to be
//! an alias produced by an earlier build, and is never aliased again. This is
//! what makes repeated runs over the same workspace safe.
//!
//! # Stem and Extension
//!
//! The file name is split at its _last_ dot. Everything before that dot is the
//! stem, everything after it is the extension. Names without a dot have no
//! extension. Names that start with their only dot, e.g., `.war`, have an
//! empty stem and keep the rest as extension. This differs from
//! [`Path::file_stem`], which treats leading dots as part of the stem.

use super::{AliasError, Result};

use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Alias marker.
///
/// Separates stem from build number, and flags a file name as an alias.
pub const MARKER: &str = "##";

/// Build artifact subject to aliasing.
///
/// File names are kept as raw OS strings, so names that are not valid UTF-8
/// still produce aliases with the exact same stem and extension bytes.
///
/// # Invariant
///
/// - Path always has a final file name segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    name: OsString,
}

impl Artifact {
    /// Construct new artifact from path.
    ///
    /// Does not check if the path exists.
    ///
    /// # Errors
    ///
    /// - Return [`AliasError::InvalidArtifact`] if path has no file name,
    ///   e.g., `/` or `foo/..`.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .filter(|name| !name.is_empty())
            .map(OsStr::to_os_string)
            .ok_or_else(|| AliasError::InvalidArtifact { path: path.clone() })?;

        Ok(Self { path, name })
    }

    /// Full path to artifact.
    pub fn as_path(&self) -> &Path {
        self.path.as_path()
    }

    /// File name of artifact.
    pub fn name(&self) -> &OsStr {
        self.name.as_os_str()
    }

    /// File name of artifact for display purposes.
    ///
    /// Invalid UTF-8 sequences are replaced with `U+FFFD`.
    pub fn display_name(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    /// Directory containing artifact.
    ///
    /// Relative artifacts without parent components live in the empty path,
    /// i.e., the current directory.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Portion of file name in front of the last dot.
    pub fn stem(&self) -> &OsStr {
        self.split().0
    }

    /// Portion of file name after the last dot.
    pub fn extension(&self) -> &OsStr {
        self.split().1
    }

    /// Check if artifact already carries the alias marker.
    pub fn is_alias(&self) -> bool {
        self.name
            .as_encoded_bytes()
            .windows(MARKER.len())
            .any(|window| window == MARKER.as_bytes())
    }

    fn split(&self) -> (&OsStr, &OsStr) {
        let bytes = self.name.as_encoded_bytes();
        match bytes.iter().rposition(|byte| *byte == b'.') {
            // SAFETY: Both halves are split right before and right after an
            // ASCII dot, which is a valid UTF-8 substring boundary.
            Some(dot) => unsafe {
                (
                    OsStr::from_encoded_bytes_unchecked(&bytes[..dot]),
                    OsStr::from_encoded_bytes_unchecked(&bytes[dot + 1..]),
                )
            },
            None => (self.name.as_os_str(), OsStr::new("")),
        }
    }
}

/// Build identifier embedded into alias names.
///
/// Always displayed in minimal decimal form: no sign, no leading zeros.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildNumber(u64);

impl BuildNumber {
    /// Construct new build number.
    pub fn new(number: u64) -> Self {
        Self(number)
    }

    /// Raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for BuildNumber {
    fn from(number: u64) -> Self {
        Self(number)
    }
}

impl FromStr for BuildNumber {
    type Err = std::num::ParseIntError;

    fn from_str(data: &str) -> std::result::Result<Self, Self::Err> {
        data.parse::<u64>().map(Self)
    }
}

impl Display for BuildNumber {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}", self.0)
    }
}

/// Derive alias file name for artifact.
///
/// Produces `<stem>##<build>.<extension>`, or `<stem>##<build>` when the
/// artifact has no extension.
pub fn derive_alias_name(artifact: &Artifact, build: BuildNumber) -> OsString {
    let (stem, extension) = artifact.split();
    let mut alias = stem.to_os_string();
    alias.push(MARKER);
    alias.push(build.to_string());
    if !extension.is_empty() {
        alias.push(".");
        alias.push(extension);
    }

    alias
}

/// Derive alias path for artifact.
///
/// Alias always resides in the same directory as the artifact itself.
pub fn derive_alias_path(artifact: &Artifact, build: BuildNumber) -> PathBuf {
    artifact.dir().join(derive_alias_name(artifact, build))
}
