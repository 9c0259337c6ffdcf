// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{stdout, WorkspaceFixture};

use anyhow::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::path::Path;
use warnum::{config::JobDefinition, step::NumberingStep, BuildNumber, Interrupt, OutputMode};

#[sealed_test]
fn run_hardlink_keeps_original() -> Result<()> {
    let ws = WorkspaceFixture::new("ws")?;
    ws.add_artifact("target/app.war", "app")?;

    let output = ws.warnum(["run", "42", "-w"].into_iter().map(Path::new).chain([ws.root()]))?;
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Create link app##42.war to app.war\n");
    assert_eq!(ws.file_names("target")?, vec!["app##42.war", "app.war"]);
    assert_eq!(ws.read("target/app##42.war")?, "app");

    Ok(())
}

#[sealed_test]
fn run_rename_consumes_original() -> Result<()> {
    let ws = WorkspaceFixture::new("ws")?;
    ws.add_artifact("target/app.war", "app")?;

    let output = ws.warnum(["run", "42", "--rename", "-w"].into_iter().map(Path::new).chain([ws.root()]))?;
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Create link app##42.war to app.war\n");
    assert_eq!(ws.file_names("target")?, vec!["app##42.war"]);

    Ok(())
}

#[sealed_test]
fn run_leaves_marked_artifacts_alone() -> Result<()> {
    let ws = WorkspaceFixture::new("ws")?;
    ws.add_artifact("release##7.war", "release")?;

    for mode in ["--rename", "--hardlink"] {
        let output = ws.warnum(["run", "8", mode, "-w"].into_iter().map(Path::new).chain([ws.root()]))?;
        assert!(output.status.success());
        assert_eq!(stdout(&output), "");
    }
    assert_eq!(ws.file_names(".")?, vec!["release##7.war"]);

    Ok(())
}

#[sealed_test]
fn run_rename_rerun_clobbers_same_build() -> Result<()> {
    let ws = WorkspaceFixture::new("ws")?;
    ws.add_artifact("app.war", "first")?;
    let args = || ["run", "42", "--rename", "-w"].into_iter().map(Path::new).chain([ws.root()]);

    assert!(ws.warnum(args())?.status.success());
    let state = ws.file_names(".")?;

    // Nothing left to alias, so the second run changes nothing.
    let output = ws.warnum(args())?;
    assert!(output.status.success());
    assert_eq!(stdout(&output), "");
    assert_eq!(ws.file_names(".")?, state);

    // Rebuilt artifact replaces alias of the same build.
    ws.add_artifact("app.war", "second")?;
    assert!(ws.warnum(args())?.status.success());
    assert_eq!(ws.file_names(".")?, vec!["app##42.war"]);
    assert_eq!(ws.read("app##42.war")?, "second");

    Ok(())
}

#[sealed_test]
fn run_hardlink_rerun_logs_failure_but_succeeds() -> Result<()> {
    let ws = WorkspaceFixture::new("ws")?;
    ws.add_artifact("app.war", "app")?;
    let args = || ["run", "42", "-w"].into_iter().map(Path::new).chain([ws.root()]);

    assert!(ws.warnum(args())?.status.success());

    let output = ws.warnum(args())?;
    assert!(output.status.success());
    let progress = stdout(&output);
    let lines = progress.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Create link app##42.war to app.war");
    assert!(lines[1].starts_with("ERROR: failed to hardlink"));

    Ok(())
}

#[sealed_test]
fn run_custom_pattern_without_extension() -> Result<()> {
    let ws = WorkspaceFixture::new("ws")?;
    ws.add_artifact("archive", "data")?;

    let output = ws.warnum(
        ["run", "3", "-p", "archive", "-w"].into_iter().map(Path::new).chain([ws.root()]),
    )?;
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Create link archive##3 to archive\n");
    assert_eq!(ws.file_names(".")?, vec!["archive", "archive##3"]);

    Ok(())
}

#[sealed_test]
fn init_then_run_with_propagated_failures() -> Result<()> {
    let ws = WorkspaceFixture::new("ws")?;
    ws.add_artifact("app.war", "app")?;
    ws.add_artifact("app##5.war", "taken")?;
    let config = ws.path("jobs/job.toml");

    let output = ws.warnum(
        ["init", "--propagate-failures", "-c"].into_iter().map(Path::new).chain([config.as_path()]),
    )?;
    assert!(output.status.success());
    let definition: JobDefinition = ws.read("jobs/job.toml")?.parse()?;
    assert_eq!(
        definition.to_string(),
        indoc! {r#"
            [settings]
            pattern = "**/*.war"
            mode = "hardlink"
            failure_policy = "propagate"
        "#}
    );

    // Refuse to clobber existing definition.
    let output = ws.warnum(["init", "-c"].into_iter().map(Path::new).chain([config.as_path()]))?;
    assert!(!output.status.success());

    let output = ws.warnum(
        ["run", "5", "-c"]
            .into_iter()
            .map(Path::new)
            .chain([config.as_path(), Path::new("-w"), ws.root()]),
    )?;
    assert!(!output.status.success());
    assert_eq!(ws.read("app##5.war")?, "taken");

    Ok(())
}

#[sealed_test]
fn numbering_step_over_nested_workspace() -> Result<()> {
    let ws = WorkspaceFixture::new("ws")?;
    ws.add_artifact("a/one.war", "1")?;
    ws.add_artifact("b/c/two.war", "2")?;
    ws.add_artifact("b/c/notes.txt", "")?;

    let mut definition = JobDefinition::default();
    definition.settings.mode = OutputMode::Rename;
    let step = NumberingStep::new(definition.settings);
    let mut sink: Vec<String> = Vec::new();

    assert!(step.perform(ws.root(), BuildNumber::new(9), &mut sink, &Interrupt::new()));
    assert_eq!(
        sink,
        vec![
            "Create link one##9.war to one.war".to_string(),
            "Create link two##9.war to two.war".to_string(),
        ]
    );
    assert_eq!(ws.file_names("a")?, vec!["one##9.war"]);
    assert_eq!(ws.file_names("b/c")?, vec!["notes.txt", "two##9.war"]);

    Ok(())
}
