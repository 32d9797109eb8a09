//! Settings resolution: CLI → env → config file → defaults.

use crate::settings::Settings;
use crate::DEFAULT_CONFIG_FILE;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Explicit config file path.
pub const ENV_CONFIG: &str = "CASCADE_CONFIG";
/// Global tier directory.
pub const ENV_GLOBAL_ROOT: &str = "CASCADE_GLOBAL_ROOT";
/// Activation threshold.
pub const ENV_MIN_COUNT: &str = "CASCADE_MIN_COUNT";
/// Overall warning cap; `0` disables the cap.
pub const ENV_MAX_TOTAL: &str = "CASCADE_MAX_TOTAL";

/// Errors from configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("home directory cannot be resolved")]
    HomeDirUnavailable,

    #[error("project root {path} cannot be resolved: {source}")]
    ProjectRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

impl From<ConfigError> for cascade_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::HomeDirUnavailable => Self::HomeDirUnavailable,
            ConfigError::ProjectRoot { path, .. } => Self::ProjectRoot { path },
            other => Self::Config(other.to_string()),
        }
    }
}

/// Values given explicitly on the command line. They win over everything.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub global_root: Option<PathBuf>,
    pub min_count: Option<u32>,
    pub max_per_error: Option<usize>,
    pub max_total: Option<usize>,
}

/// Resolve settings for a project using the process environment.
pub fn resolve_settings(project_root: &Path, overrides: &Overrides) -> Result<Settings, ConfigError> {
    resolve_with_env(project_root, overrides, |key| std::env::var(key).ok())
}

/// Resolve settings with an injectable environment lookup.
pub fn resolve_with_env<F>(
    project_root: &Path,
    overrides: &Overrides,
    env: F,
) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // 1) Config file: explicit path must exist, the project default may not.
    let explicit = overrides
        .config_path
        .clone()
        .or_else(|| env(ENV_CONFIG).map(PathBuf::from));
    let mut settings = match explicit {
        Some(path) => load_file(&path)?,
        None => {
            let path = project_root.join(DEFAULT_CONFIG_FILE);
            if path.exists() {
                load_file(&path)?
            } else {
                Settings::default()
            }
        }
    };

    // 2) Environment
    if let Some(root) = env(ENV_GLOBAL_ROOT) {
        settings.global_root = PathBuf::from(root);
    }
    if let Some(raw) = env(ENV_MIN_COUNT) {
        settings.min_count = parse_env(ENV_MIN_COUNT, &raw)?;
    }
    if let Some(raw) = env(ENV_MAX_TOTAL) {
        let cap: usize = parse_env(ENV_MAX_TOTAL, &raw)?;
        settings.max_total = (cap > 0).then_some(cap);
    }

    // 3) Command line
    if let Some(root) = &overrides.global_root {
        settings.global_root = root.clone();
    }
    if let Some(min_count) = overrides.min_count {
        settings.min_count = min_count;
    }
    if overrides.max_per_error.is_some() {
        settings.max_per_error = overrides.max_per_error;
    }
    if overrides.max_total.is_some() {
        settings.max_total = overrides.max_total;
    }

    Ok(settings)
}

fn load_file(path: &Path) -> Result<Settings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = serde_json::from_str(&raw).map_err(|source| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(target: "cascade.config", path = %path.display(), "loaded config file");
    Ok(settings)
}

fn parse_env<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: raw.to_string(),
    })
}
