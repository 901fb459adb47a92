use super::discover::SourceFileSet;
use super::stream::{OutputSink, ProcessOutcome, stream_child};
use crate::config::BuildConfig;
use crate::error::{MakeError, Result};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

pub const OUTPUT_FLAG: &str = "-o";

// --- Helper: Prepare Output Directory ---
// Only the leaf is created; a missing parent is an error.
pub fn prepare_dist_dir(dist_dir: &Path) -> Result<()> {
    if dist_dir.is_dir() {
        return Ok(());
    }
    fs::create_dir(dist_dir).map_err(|source| MakeError::DistDir {
        path: dist_dir.to_path_buf(),
        source,
    })?;
    debug!(path = %dist_dir.display(), "created output directory");
    Ok(())
}

/// `[...sources, "-o", output]`
pub fn compile_args(sources: &[PathBuf], output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = sources.iter().map(|p| p.as_os_str().to_owned()).collect();
    args.push(OUTPUT_FLAG.into());
    args.push(output.as_os_str().to_owned());
    args
}

// --- CORE: Compile ---
// A nonzero compiler exit comes back as an outcome, not an error.
pub async fn build<S>(
    config: &BuildConfig,
    files: &SourceFileSet,
    sink: &mut S,
) -> Result<ProcessOutcome>
where
    S: OutputSink + ?Sized,
{
    prepare_dist_dir(&config.dist_dir)?;

    let output = config.output_path();
    let args = compile_args(files.sources(), &output);
    info!(
        compiler = %config.compiler,
        inputs = files.sources().len(),
        output = %output.display(),
        "invoking compiler"
    );

    let child = Command::new(&config.compiler)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| match source.kind() {
            ErrorKind::NotFound => MakeError::CompilerNotFound {
                compiler: config.compiler.clone(),
            },
            _ => MakeError::Spawn {
                program: PathBuf::from(&config.compiler),
                source,
            },
        })?;

    let outcome = stream_child(child, sink).await?;
    debug!(exit_code = ?outcome.exit_code, "compiler finished");
    Ok(outcome)
}
