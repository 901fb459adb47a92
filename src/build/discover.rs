use super::utils::{extension_of, is_header_extension};
use crate::error::{MakeError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Files picked up under the source root, sorted for reproducible builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileSet {
    sources: Vec<PathBuf>,
    headers: Vec<PathBuf>,
}

impl SourceFileSet {
    /// Translation units handed to the compiler. Never empty.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Header-like files matched by the extension set; staged only.
    pub fn headers(&self) -> &[PathBuf] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.sources.len() + self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn discover(source_dir: &Path, include_extensions: &[String]) -> Result<SourceFileSet> {
    let no_sources = || MakeError::NoSourceFiles {
        dir: source_dir.to_path_buf(),
        extensions: include_extensions.to_vec(),
    };

    if !source_dir.is_dir() {
        warn!(dir = %source_dir.display(), "source directory does not exist");
        return Err(no_sources());
    }

    let mut sources = Vec::new();
    let mut headers = Vec::new();

    for entry in WalkDir::new(source_dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Unreadable subtree or symlink loop: skip it, keep walking.
                warn!(error = %e, "skipping entry under {}", source_dir.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(ext) = extension_of(path) else {
            continue;
        };
        if !include_extensions.iter().any(|e| e == ext) {
            continue;
        }
        if is_header_extension(ext) {
            headers.push(path.to_path_buf());
        } else {
            sources.push(path.to_path_buf());
        }
    }

    // Walk order is already by name per directory; a flat sort also makes
    // the order independent of how siblings and subtrees interleave.
    sources.sort();
    headers.sort();

    debug!(
        sources = sources.len(),
        headers = headers.len(),
        "discovered files under {}",
        source_dir.display()
    );

    if sources.is_empty() {
        return Err(no_sources());
    }

    Ok(SourceFileSet { sources, headers })
}
