//! Typed settings for the pattern engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Project tier location, relative to the project root.
pub const DEFAULT_PROJECT_FILE: &str = ".cascade/patterns.json";

/// Global tier directory used when no platform data dir is known.
pub const FALLBACK_GLOBAL_ROOT: &str = "~/.local/share/cascade/patterns";

/// Default activation threshold.
pub const DEFAULT_MIN_COUNT: u32 = 3;

/// Default cap on warnings across all input codes.
pub const DEFAULT_MAX_TOTAL: usize = 5;

/// Default eviction age for learned patterns.
pub const DEFAULT_PATTERN_MAX_AGE_DAYS: u64 = 90;

/// Default idle timeout for sessions.
pub const DEFAULT_SESSION_MAX_AGE_HOURS: u64 = 24;

/// Engine settings. Every field may be omitted from the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Project tier file, relative to the project root.
    pub project_file: PathBuf,

    /// Directory holding one global tier file per project. May start with `~/`.
    pub global_root: PathBuf,

    /// Minimum merged count before a cascade is advised on.
    pub min_count: u32,

    /// Per-input-code warning cap. `None` means unlimited.
    pub max_per_error: Option<usize>,

    /// Warning cap across all input codes. `None` means unlimited.
    pub max_total: Option<usize>,

    /// Learned patterns not seen for this many days are evicted.
    pub pattern_max_age_days: u64,

    /// Sessions idle for this many hours are evicted.
    pub session_max_age_hours: u64,

    /// Write the built-in catalog when the project tier does not exist yet.
    pub seed_on_first_use: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_file: PathBuf::from(DEFAULT_PROJECT_FILE),
            global_root: default_global_root(),
            min_count: DEFAULT_MIN_COUNT,
            max_per_error: None,
            max_total: Some(DEFAULT_MAX_TOTAL),
            pattern_max_age_days: DEFAULT_PATTERN_MAX_AGE_DAYS,
            session_max_age_hours: DEFAULT_SESSION_MAX_AGE_HOURS,
            seed_on_first_use: true,
        }
    }
}

impl Settings {
    pub fn pattern_max_age(&self) -> Duration {
        days(self.pattern_max_age_days)
    }

    pub fn session_max_age(&self) -> Duration {
        hours(self.session_max_age_hours)
    }
}

/// `n` days, saturating at `u64::MAX` seconds.
pub fn days(n: u64) -> Duration {
    Duration::from_secs(n.saturating_mul(24 * 60 * 60))
}

/// `n` hours, saturating at `u64::MAX` seconds.
pub fn hours(n: u64) -> Duration {
    Duration::from_secs(n.saturating_mul(60 * 60))
}

/// Platform data dir when known, `~/.local/share` fallback otherwise.
fn default_global_root() -> PathBuf {
    dirs::data_dir()
        .map(|base| base.join("cascade").join("patterns"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_GLOBAL_ROOT))
}
