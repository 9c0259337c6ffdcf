// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Build-numbered aliases for build artifacts.
//!
//! After a build produces its archives, warnum gives each of them a second
//! name that embeds the build number, e.g., `app.war` becomes reachable as
//! `app##42.war` in build 42. Aliases are created either as hard links next to
//! the original artifact, or by renaming the artifact outright.
//!
//! The [`alias`] module holds the aliasing logic proper and can be driven by
//! any caller that supplies artifacts, a build number, and a progress sink.
//! Everything else in this crate exists to make it usable as a standalone
//! build step: [`discover`] finds artifacts, [`config`] describes the job,
//! and [`step`] ties both together with the error policy.

pub mod alias;
pub mod config;
pub mod discover;
pub mod path;
pub mod progress;
pub mod step;

pub use alias::{
    name::{derive_alias_path, Artifact, BuildNumber, MARKER},
    AliasError, Aliaser, Interrupt, OutputMode,
};
