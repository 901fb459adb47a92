use crate::config::ConfigDocument;
use crate::error::{MakeError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Extensions that are staged with the sources but never passed to the
/// compiler as translation units.
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "h++", "inl", "ipp", "tpp"];

// --- Helper: Load Config Document ---
pub fn load_document(path: &Path, cwd: &Path) -> Result<ConfigDocument> {
    if !path.is_file() {
        return Err(MakeError::ConfigNotFound {
            path: path.to_path_buf(),
            cwd: cwd.to_path_buf(),
        });
    }

    let raw = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = raw.len(), "read config document");

    let parse_error = |message: String| MakeError::ConfigParse {
        path: path.to_path_buf(),
        message,
    };

    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    if is_toml {
        toml::from_str(&raw).map_err(|e| parse_error(e.to_string()))
    } else {
        serde_json::from_str(&raw).map_err(|e| parse_error(e.to_string()))
    }
}

/// Lexically normalise a path: drop `.` components and fold `..` into
/// their parent. Does not touch the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// The token after the last `.` of the file name, if any.
pub fn extension_of(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

pub fn is_header_extension(ext: &str) -> bool {
    HEADER_EXTENSIONS.contains(&ext)
}
