//! Pattern repository.
//!
//! Two independent tiers of [`PatternData`] are kept:
//!
//! ```text
//! <project>/.cascade/patterns.json          # project tier: seed/shared, checked in
//! <global_root>/<sha256(project)[..8]>.json # global tier: learned, machine-local
//! ```
//!
//! Only the global tier is written by learning and eviction. Every read
//! path goes through [`merge::merge_tiers`], which sums counts of keys present
//! in both tiers.

pub mod merge;
mod persist;
mod repository;
mod types;

pub use merge::merge_tiers;
pub use repository::{PatternStore, StorePaths, StoreStats};
pub use types::{pattern_key, FailurePattern, PatternData, SessionEntry, Tier};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from explicit write paths. Reads never fail.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize pattern data: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for cascade_common::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io { path, source } => Self::Persist { path, source },
            StoreError::Json(e) => Self::Json(e),
        }
    }
}
