// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use warnum::{
    config::{FailurePolicy, JobDefinition, Workspace},
    path::default_job_definition_path,
    progress::WriterSink,
    step::NumberingStep,
    BuildNumber, Interrupt, OutputMode,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::{env, fs, path::PathBuf, process::exit};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  warnum [options] <warnum-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<()> {
        match self.command {
            Command::Run(opts) => run_alias(opts).await,
            Command::Init(opts) => run_init(opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Alias workspace artifacts with build number.
    #[command(override_usage = "warnum run [options] <build_number>")]
    Run(RunOptions),

    /// Write new job definition.
    #[command(override_usage = "warnum init [options]")]
    Init(InitOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct RunOptions {
    /// Number of build that produced the artifacts.
    #[arg(required = true, value_name = "build_number")]
    pub build_number: BuildNumber,

    /// Path to job definition to use instead of the default one.
    #[arg(short, long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Workspace to search for artifacts.
    #[arg(short, long, value_name = "path")]
    pub workspace: Option<PathBuf>,

    /// Glob pattern selecting artifacts relative to workspace.
    #[arg(short, long, value_name = "glob")]
    pub pattern: Option<String>,

    /// Rename artifacts to their alias.
    #[arg(short, long, group = "mode")]
    pub rename: bool,

    /// Hard link artifacts to their alias.
    #[arg(long, group = "mode")]
    pub hardlink: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InitOptions {
    /// Path to write job definition to instead of the default one.
    #[arg(short, long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Workspace to search for artifacts.
    #[arg(short, long, value_name = "path")]
    pub workspace: Option<PathBuf>,

    /// Glob pattern selecting artifacts relative to workspace.
    #[arg(short, long, value_name = "glob")]
    pub pattern: Option<String>,

    /// Rename artifacts to their alias instead of hard linking them.
    #[arg(short, long)]
    pub rename: bool,

    /// Fail the build when an error gets logged.
    #[arg(long)]
    pub propagate_failures: bool,

    /// Overwrite existing job definition.
    #[arg(short, long)]
    pub force: bool,
}

#[tokio::main]
async fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run().await {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

async fn run() -> Result<()> {
    Cli::parse().run().await
}

async fn run_alias(opts: RunOptions) -> Result<()> {
    let mut definition = load_definition(opts.config)?;
    let settings = &mut definition.settings;
    if let Some(pattern) = opts.pattern {
        settings.pattern = pattern;
    }
    if opts.rename {
        settings.mode = OutputMode::Rename;
    } else if opts.hardlink {
        settings.mode = OutputMode::Hardlink;
    }

    let workspace = match opts.workspace {
        Some(path) => path,
        None => match settings.workspace.take() {
            Some(workspace) => workspace.as_path().to_path_buf(),
            None => env::current_dir().context("cannot determine current directory")?,
        },
    };

    // INVARIANT: Ctrl-C only raises the signal, the batch stops between artifacts.
    let interrupt = Interrupt::new();
    let signal = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after current artifact");
            signal.raise();
        }
    });

    let build = opts.build_number;
    let step = NumberingStep::new(definition.settings);
    let success = tokio::task::spawn_blocking(move || {
        let mut sink = WriterSink::stdout();
        step.perform(&workspace, build, &mut sink, &interrupt)
    })
    .await?;

    if !success {
        bail!("numbering of build {build} failed");
    }

    Ok(())
}

fn run_init(opts: InitOptions) -> Result<()> {
    let path = match opts.config {
        Some(path) => path,
        None => default_job_definition_path()?,
    };
    if path.exists() && !opts.force {
        bail!("job definition {:?} already exists", path.display());
    }

    let mut definition = JobDefinition::default();
    definition.settings.mode = OutputMode::from_rename_flag(opts.rename);
    if let Some(pattern) = opts.pattern {
        definition.settings.pattern = pattern;
    }
    definition.settings.workspace = opts.workspace.map(Workspace::new);
    if opts.propagate_failures {
        definition.settings.failure_policy = FailurePolicy::Propagate;
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        mkdirp::mkdirp(parent)
            .with_context(|| format!("failed to create directory {:?}", parent.display()))?;
    }
    fs::write(&path, definition.to_string())
        .with_context(|| format!("failed to write job definition {:?}", path.display()))?;
    info!("wrote job definition {:?}", path.display());

    Ok(())
}

fn load_definition(path: Option<PathBuf>) -> Result<JobDefinition> {
    let path = match path {
        Some(path) => path,
        None => {
            let path = default_job_definition_path()?;
            if !path.exists() {
                debug!("no job definition at {:?}, using defaults", path.display());
                return Ok(JobDefinition::default());
            }
            path
        }
    };

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read job definition {:?}", path.display()))?;
    let definition: JobDefinition = data
        .parse()
        .with_context(|| format!("invalid job definition {:?}", path.display()))?;
    debug!("loaded job definition {:?}", path.display());

    Ok(definition)
}
