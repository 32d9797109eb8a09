//! Tier file I/O.
//!
//! Reads fail soft: a missing, unreadable or corrupt file is an empty tier.
//! Writes go to a temporary file in the destination directory and are
//! renamed over the target, so a concurrent reader sees either the old or
//! the new file, never a partial one.

use super::types::{PatternData, Tier};
use super::StoreError;
use cascade_common::schema::is_compatible;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::{debug, warn};

#[cfg(unix)]
const DIR_MODE: u32 = 0o700;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Load a tier, falling back to empty data on any failure.
pub(crate) fn read_tier(path: &Path, tier: Tier) -> PatternData {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(target: "cascade.store", %tier, path = %path.display(), "no tier file");
            return PatternData::default();
        }
        Err(e) => {
            warn!(target: "cascade.store", %tier, path = %path.display(), error = %e, "unreadable tier file, treating as empty");
            return PatternData::default();
        }
    };

    match PatternData::from_json(&raw) {
        Ok(data) => {
            if !is_compatible(data.version) {
                warn!(
                    target: "cascade.store",
                    %tier,
                    version = data.version,
                    "tier written by a newer version; unknown fields ignored"
                );
            }
            debug!(
                target: "cascade.store",
                %tier,
                patterns = data.patterns.len(),
                sessions = data.sessions.len(),
                "loaded tier"
            );
            data
        }
        Err(e) => {
            warn!(target: "cascade.store", %tier, path = %path.display(), error = %e, "corrupt tier file, treating as empty");
            PatternData::default()
        }
    }
}

/// Serialize and atomically replace `path`.
pub(crate) fn write_tier(path: &Path, data: &PatternData) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(data)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_private_dir(parent)?;
    }

    let tmp_path = path.with_extension(format!("json.tmp.{}", std::process::id()));
    let written = write_private(&tmp_path, &json).and_then(|()| {
        fs::rename(&tmp_path, path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    });
    if written.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    written?;

    debug!(target: "cascade.store", path = %path.display(), bytes = json.len(), "tier saved");
    Ok(())
}

fn write_private(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut options = OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }

    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(bytes).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    Ok(())
}

fn ensure_private_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.is_dir() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::FailurePattern;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let data = read_tier(&dir.path().join("none.json"), Tier::Global);
        assert!(data.patterns.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"patterns\": [1, 2").unwrap();
        let data = read_tier(&path, Tier::Project);
        assert!(data.patterns.is_empty());
    }

    #[test]
    fn test_write_creates_dirs_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/tier.json");
        let mut data = PatternData::default();
        let p = FailurePattern::observed("A", "B", Utc::now());
        data.patterns.insert(p.key(), p);

        write_tier(&path, &data).unwrap();

        let back = read_tier(&path, Tier::Global);
        assert_eq!(back.patterns.len(), 1);
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("private/tier.json");
        write_tier(&path, &PatternData::default()).unwrap();

        let file_mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let dir_mode = fs::metadata(path.parent().unwrap()).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode & 0o077, 0);
        assert_eq!(dir_mode & 0o077, 0);
    }

    #[test]
    fn test_failed_rename_removes_temp() {
        let dir = TempDir::new().unwrap();
        // A directory at the destination makes the rename fail.
        let path = dir.path().join("tier.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let err = write_tier(&path, &PatternData::default()).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        let tmp_count = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp"))
            .count();
        assert_eq!(tmp_count, 0);
    }
}
