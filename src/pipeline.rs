//! Top-level orchestration: resolve -> discover -> compile -> (run).
//!
//! Every abort point is an early `Err(MakeError)`; the compiler exiting
//! nonzero is an `Ok(BuildReport::CompileFailed)`. Nothing here reads the
//! process cwd or argv or exits the process.

use crate::build::{
    self, Artifact, CompilerSink, ProcessOutcome, RunReport, SourceFileSet, discover,
    locate_and_run, locate_artifact,
};
use crate::cli::{Invocation, parse_args};
use crate::config::{BuildConfig, CliOverrides, resolve_config};
use crate::error::{MakeError, Result};
use crate::ui;
use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressFinish, ProgressStyle};
use std::ffi::OsString;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// What one invocation did.
#[derive(Debug)]
pub enum RunOutcome {
    /// Help or version text was requested; nothing was resolved or built.
    Info(String),
    Build(BuildReport),
}

impl RunOutcome {
    pub fn into_report(self) -> Option<BuildReport> {
        match self {
            RunOutcome::Info(_) => None,
            RunOutcome::Build(report) => Some(report),
        }
    }
}

#[derive(Debug)]
pub enum BuildReport {
    CompileFailed { outcome: ProcessOutcome },
    Built {
        artifact: Artifact,
        run: Option<RunReport>,
    },
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        !matches!(self, BuildReport::CompileFailed { .. })
    }
}

/// Parse `args` (program name first), resolve configuration against `cwd`
/// and run the build.
pub async fn run<I, T>(cwd: &Path, args: I) -> Result<RunOutcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    match parse_args(args)? {
        Invocation::Info(text) => Ok(RunOutcome::Info(text)),
        Invocation::Build(overrides) => build_with(cwd, &overrides).await.map(RunOutcome::Build),
    }
}

/// Resolve configuration for `overrides` against `cwd` and run the build.
pub async fn build_with(cwd: &Path, overrides: &CliOverrides) -> Result<BuildReport> {
    let config = resolve_config(cwd, overrides)?;
    info!(config = %config.config_file.display(), "configuration resolved");
    execute(cwd, &config).await
}

/// Run the pipeline for an already-resolved configuration.
pub async fn execute(cwd: &Path, config: &BuildConfig) -> Result<BuildReport> {
    let start_time = Instant::now();
    ui::banner(cwd, config);

    // 1. Collect Source Files
    let files = match discover(&config.source_dir, &config.include_extensions) {
        Ok(files) => files,
        Err(e @ MakeError::NoSourceFiles { .. }) => {
            ui::print_config(config);
            return Err(e);
        }
        Err(e) => return Err(e),
    };
    stage(&files);

    // 2. Compile
    let mut sink = CompilerSink::new(Some(spinner()));
    let outcome = build::build(config, &files, &mut sink).await?;

    if !outcome.success() {
        println!(
            "{} Build failed with exit code: {}",
            "x".red(),
            outcome.code_label()
        );
        if let Some(hint) = sink.hint() {
            println!("\n{} {}", "💡".yellow(), hint);
        }
        return Ok(BuildReport::CompileFailed { outcome });
    }

    println!(
        "\n{} Compilation successful.. ({:.2?})",
        "✓".green(),
        start_time.elapsed()
    );

    // 3. Post-build
    if !config.run_after_build {
        let artifact = locate_artifact(&config.dist_dir, &config.executable);
        println!("Executable: {}", artifact.path.display());
        return Ok(BuildReport::Built {
            artifact,
            run: None,
        });
    }

    let (artifact, run) = locate_and_run(&config.dist_dir, &config.executable).await;
    Ok(BuildReport::Built {
        artifact,
        run: Some(run),
    })
}

fn stage(files: &SourceFileSet) {
    for file in files.sources() {
        println!("Staging => {}", file.display());
    }
    for header in files.headers() {
        println!("Staging => {} {}", header.display(), "(header, not compiled)".dimmed());
    }
}

// Drawn on stdout with the rest of the build output; hidden when stdout is
// not a terminal.
fn spinner() -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout())
        .with_finish(ProgressFinish::AndClear);
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Compiling...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
