//! Storage path helpers.
//!
//! The global tier lives in `<global_root>/<hash>.json`, where `<hash>` is
//! derived from the absolute project root. The same project always maps to
//! the same file and distinct projects never share one, without a registry.

use crate::resolve::ConfigError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Number of digest bytes kept in the global file name.
const HASH_PREFIX_BYTES: usize = 8;

/// Expand a leading `~/` (or a bare `~`) to the invoking user's home directory.
pub fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
    Ok(home.join(rest))
}

/// Lowercase hex of the first 8 bytes of `sha256(project_root)`.
pub fn project_hash(project_root: &Path) -> String {
    let digest = Sha256::digest(project_root.to_string_lossy().as_bytes());
    hex::encode(&digest[..HASH_PREFIX_BYTES])
}

/// Global tier file for a project.
pub fn global_file(global_root: &Path, project_root: &Path) -> Result<PathBuf, ConfigError> {
    let root = expand_home(global_root)?;
    Ok(root.join(format!("{}.json", project_hash(project_root))))
}

/// Absolute, symlink-resolved project root.
pub fn absolute_root(project_root: &Path) -> Result<PathBuf, ConfigError> {
    std::fs::canonicalize(project_root).map_err(|source| ConfigError::ProjectRoot {
        path: project_root.to_path_buf(),
        source,
    })
}
