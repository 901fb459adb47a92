use crate::build::utils::normalize_path;
use crate::error::{MakeError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "makeconfig.json";

/// Built-in settings, the lowest layer of the merge.
#[derive(Debug, Clone)]
pub struct ConfigDefaults {
    pub src: String,
    pub dist: String,
    pub executable: String,
    pub include_file_types: Vec<String>,
    pub run_after_build: bool,
    pub compiler: String,
    pub config_file: String,
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        Self {
            src: "./src".to_string(),
            dist: "./dist".to_string(),
            executable: "main".to_string(),
            include_file_types: vec!["cpp".to_string(), "hpp".to_string()],
            run_after_build: false,
            compiler: "g++".to_string(),
            config_file: DEFAULT_CONFIG_FILE.to_string(),
        }
    }
}

/// The config document as read from disk. Every field is optional so that
/// absent keys fall through to the defaults; unknown keys land in `extra`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    pub src: Option<String>,
    pub dist: Option<String>,
    pub executable: Option<String>,
    pub include_file_types: Option<Vec<String>>,
    pub run_after_build: Option<bool>,
    pub compiler: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Values supplied on the command line, the highest layer of the merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub config_file: Option<String>,
}

impl CliOverrides {
    /// The config path to load, relative paths resolved against `cwd`.
    pub fn config_path(&self, defaults: &ConfigDefaults, cwd: &Path) -> PathBuf {
        let name = self
            .config_file
            .as_deref()
            .unwrap_or(defaults.config_file.as_str());
        normalize_path(&cwd.join(name))
    }
}

/// Fully resolved settings for one build. Paths are absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub source_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub executable: String,
    pub include_extensions: Vec<String>,
    pub run_after_build: bool,
    pub compiler: String,
    pub config_file: PathBuf,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BuildConfig {
    /// Merge the three layers: defaults < document < CLI overrides.
    pub fn resolve(
        defaults: &ConfigDefaults,
        document: ConfigDocument,
        overrides: &CliOverrides,
        cwd: &Path,
    ) -> Result<Self> {
        let config_file = overrides.config_path(defaults, cwd);

        let src = document.src.unwrap_or_else(|| defaults.src.clone());
        let dist = document.dist.unwrap_or_else(|| defaults.dist.clone());
        let executable = document
            .executable
            .unwrap_or_else(|| defaults.executable.clone());
        let include_file_types = document
            .include_file_types
            .unwrap_or_else(|| defaults.include_file_types.clone());
        let run_after_build = document
            .run_after_build
            .unwrap_or(defaults.run_after_build);
        let compiler = document
            .compiler
            .unwrap_or_else(|| defaults.compiler.clone());

        let invalid = |message: String| MakeError::ConfigParse {
            path: config_file.clone(),
            message,
        };

        let executable = executable.trim().to_string();
        if executable.is_empty() {
            return Err(invalid("'executable' must not be empty".to_string()));
        }
        if executable.contains(['/', '\\']) {
            return Err(invalid(format!(
                "'executable' must be a file name, got '{}'",
                executable
            )));
        }

        let include_extensions = normalize_extensions(&include_file_types);
        if include_extensions.is_empty() {
            return Err(invalid(
                "'includeFileTypes' must name at least one extension".to_string(),
            ));
        }

        if compiler.trim().is_empty() {
            return Err(invalid("'compiler' must not be empty".to_string()));
        }

        Ok(Self {
            source_dir: normalize_path(&cwd.join(src)),
            dist_dir: normalize_path(&cwd.join(dist)),
            executable,
            include_extensions,
            run_after_build,
            compiler: compiler.trim().to_string(),
            config_file,
            extra: document.extra,
        })
    }

    /// Path the compiler is told to write to.
    pub fn output_path(&self) -> PathBuf {
        self.dist_dir.join(&self.executable)
    }

    /// Key/value pairs for diagnostic display.
    pub fn display_rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("src".to_string(), self.source_dir.display().to_string()),
            ("dist".to_string(), self.dist_dir.display().to_string()),
            ("executable".to_string(), self.executable.clone()),
            (
                "includeFileTypes".to_string(),
                self.include_extensions.join(", "),
            ),
            (
                "runAfterBuild".to_string(),
                self.run_after_build.to_string(),
            ),
            ("compiler".to_string(), self.compiler.clone()),
            ("configFile".to_string(), self.config_file.display().to_string()),
        ];
        for (key, value) in &self.extra {
            rows.push((key.clone(), value.to_string()));
        }
        rows
    }
}

/// Strip leading dots, drop blanks and duplicates, keep the configured order.
fn normalize_extensions(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ext in raw {
        let ext = ext.trim().trim_start_matches('.');
        if !ext.is_empty() && !out.iter().any(|e| e == ext) {
            out.push(ext.to_string());
        }
    }
    out
}

/// Load the config document named by `overrides` and merge it over the defaults.
pub fn resolve_config(cwd: &Path, overrides: &CliOverrides) -> Result<BuildConfig> {
    let defaults = ConfigDefaults::default();
    let path = overrides.config_path(&defaults, cwd);
    let document = crate::build::utils::load_document(&path, cwd)?;
    BuildConfig::resolve(&defaults, document, overrides, cwd)
}
