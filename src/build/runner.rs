use super::stream::{OutputSink, PassthroughSink, ProcessOutcome, stream_child};
use crate::error::{MakeError, Result};
use colored::*;
use console::Term;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// The built executable as resolved from the output directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    /// False when nothing in the listing matched and the configured name
    /// was used as-is.
    pub matched: bool,
}

/// Name test used against the listing. The executable name is treated as a
/// regex search so that platform suffixes (`.exe`) still match; a name that
/// is not a valid pattern falls back to a substring test.
enum NameMatcher {
    Pattern(Regex),
    Substring(String),
}

impl NameMatcher {
    fn new(executable: &str) -> Self {
        match Regex::new(executable) {
            Ok(re) => NameMatcher::Pattern(re),
            Err(e) => {
                debug!(error = %e, "executable name is not a valid pattern, using substring match");
                NameMatcher::Substring(executable.to_string())
            }
        }
    }

    fn is_match(&self, name: &str) -> bool {
        match self {
            NameMatcher::Pattern(re) => re.is_match(name),
            NameMatcher::Substring(s) => name.contains(s.as_str()),
        }
    }
}

// An exact name wins; otherwise the first pattern match in sorted order.
pub fn locate_artifact(dist_dir: &Path, executable: &str) -> Artifact {
    let mut names: Vec<String> = match fs::read_dir(dist_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(e) => {
            warn!(dir = %dist_dir.display(), error = %e, "could not list output directory");
            Vec::new()
        }
    };
    names.sort();

    let matcher = NameMatcher::new(executable);
    let found = names
        .iter()
        .find(|n| n.as_str() == executable)
        .or_else(|| names.iter().find(|n| matcher.is_match(n)));

    match found {
        Some(name) => Artifact {
            path: dist_dir.join(name),
            matched: true,
        },
        None => Artifact {
            path: dist_dir.join(executable),
            matched: false,
        },
    }
}

/// Run the artifact with no arguments and the caller's stdin.
pub async fn run_artifact<S>(artifact: &Artifact, sink: &mut S) -> Result<ProcessOutcome>
where
    S: OutputSink + ?Sized,
{
    let child = Command::new(&artifact.path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| MakeError::Spawn {
            program: artifact.path.clone(),
            source,
        })?;

    Ok(stream_child(child, sink).await?)
}

/// How the post-build run ended. Purely informational.
#[derive(Debug)]
pub enum RunReport {
    Ran(ProcessOutcome),
    SpawnFailed(String),
}

/// Resolve the artifact and run it, re-emitting its output on the terminal.
/// Never fails: a spawn error is reported and returned as a value.
pub async fn locate_and_run(dist_dir: &Path, executable: &str) -> (Artifact, RunReport) {
    let artifact = locate_artifact(dist_dir, executable);
    println!("Executable: {}", artifact.path.display());

    let term = Term::stdout();
    if term.is_term() {
        if let Err(e) = term.clear_screen() {
            debug!("could not clear the terminal: {}", e);
        }
    }
    println!("{} Running Executable {}", "▶".green(), artifact.path.display());
    println!("\nOutput:");
    println!("{}", crate::ui::rule());

    let mut sink = PassthroughSink::default();
    let report = match run_artifact(&artifact, &mut sink).await {
        Ok(outcome) => {
            println!("{}", crate::ui::rule());
            println!("Program exited with code {}", outcome.code_label());
            RunReport::Ran(outcome)
        }
        Err(e) => {
            warn!(error = %e, "post-build run failed to start");
            println!("{}", crate::ui::rule());
            println!("{} {}", "x".red(), e);
            RunReport::SpawnFailed(e.to_string())
        }
    };
    (artifact, report)
}
