//! Built-in cascade catalog and first-use bootstrap.
//!
//! A project without a project tier file gets the catalog below written as
//! seed patterns, so advice works before anything has been learned locally.
//! Existing project data is never touched.

use crate::store::{FailurePattern, PatternStore, StoreError};
use chrono::Utc;
use tracing::{debug, info};

/// Count given to seed patterns; above the default activation threshold.
pub const SEED_COUNT: u32 = 5;

/// Known cross-validator cascades as `(fixed code, code it tends to surface)`.
pub static SEED_CASCADES: &[(&str, &str)] = &[
    // Rewriting a commit subject into conventional form tends to lengthen it.
    ("GIT004", "GIT005"),
    // Shortening the title pushes text into over-long body lines.
    ("GIT005", "GIT006"),
    // Formatter and lint fixes leave the tree dirty after the hook ran.
    ("FMT001", "GIT013"),
    ("PY001", "PY002"),
    ("PY002", "GIT013"),
    ("SHELL001", "SHELL002"),
    ("SHELL002", "GIT013"),
    ("PY003", "TYPE001"),
    ("TYPE001", "LINT001"),
    ("LINT001", "TEST001"),
    ("GIT013", "GIT010"),
    ("DOC002", "DOC001"),
];

/// Seed the project tier if it does not exist yet.
///
/// Returns whether anything was written.
pub fn bootstrap(store: &PatternStore) -> Result<bool, StoreError> {
    if store.has_project_data() {
        debug!(target: "cascade.seed", path = %store.paths().project.display(), "project data present, not seeding");
        return Ok(false);
    }

    let now = Utc::now();
    store.insert_project_patterns(
        SEED_CASCADES
            .iter()
            .map(|(from, to)| FailurePattern::seeded(from, to, SEED_COUNT, now)),
    );
    store.save_project()?;

    info!(
        target: "cascade.seed",
        patterns = SEED_CASCADES.len(),
        path = %store.paths().project.display(),
        "seeded project patterns"
    );
    Ok(true)
}
