//! # cppmake CLI Entry Point
//!
//! The only place that reads the process working directory and arguments or
//! decides the exit status. Every error from the pipeline exits with 1; a
//! compiler failure is reported but still exits with 0.

use anyhow::{Context, Result};
use colored::*;
use cppmake::RunOutcome;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;

    match cppmake::run(&cwd, std::env::args_os()).await {
        Ok(RunOutcome::Info(text)) => {
            print!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        Ok(RunOutcome::Build(_)) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("\n{} {}", "x".red(), e);
            Ok(ExitCode::from(1))
        }
    }
}
