use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the build pipeline.
///
/// A compiler that runs and exits nonzero is *not* an error; it is reported
/// through [`crate::pipeline::BuildReport::CompileFailed`].
#[derive(Error, Debug)]
pub enum MakeError {
    #[error("{message}\n\ncppmake -c <config_file_name>.json")]
    Usage { message: String },

    #[error("Config file \"{}\" is not found in {} please include it", path.display(), cwd.display())]
    ConfigNotFound { path: PathBuf, cwd: PathBuf },

    #[error("Failed to parse config file {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error(
        "No files found in the directory mentioned in config file <src>: {}\nMake sure to check the include file types ({}) to add them for compiling",
        dir.display(),
        extensions.join(", ")
    )]
    NoSourceFiles {
        dir: PathBuf,
        extensions: Vec<String>,
    },

    #[error("Failed to create output directory {}: {source}", path.display())]
    DistDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compiler '{compiler}' was not found on PATH")]
    CompilerNotFound { compiler: String },

    #[error("Failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = MakeError> = std::result::Result<T, E>;
