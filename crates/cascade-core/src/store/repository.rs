//! Two-tier pattern repository.

use super::merge::merge_tiers;
use super::persist::{read_tier, write_tier};
use super::types::{pattern_key, FailurePattern, PatternData, SessionEntry, Tier};
use super::StoreError;
use cascade_common::DATA_VERSION;
use cascade_config::{absolute_root, global_file, ConfigError, Settings};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resolved tier file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// Project tier file.
    pub project: PathBuf,
    /// Global tier file for this project.
    pub global: PathBuf,
}

impl StorePaths {
    pub fn new(project: impl Into<PathBuf>, global: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            global: global.into(),
        }
    }

    /// Resolve both locations for a project root.
    pub fn resolve(project_root: &Path, settings: &Settings) -> Result<Self, ConfigError> {
        let root = absolute_root(project_root)?;
        Ok(Self {
            project: root.join(&settings.project_file),
            global: global_file(&settings.global_root, &root)?,
        })
    }
}

/// Pattern and session counts across tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub project_patterns: usize,
    pub global_patterns: usize,
    pub merged_patterns: usize,
    pub seed_patterns: usize,
    pub active_sessions: usize,
}

#[derive(Debug, Default)]
struct Tiers {
    project: PatternData,
    global: PatternData,
}

/// Project and global pattern tiers behind one lock.
///
/// All methods take `&self`; the store can be shared by reference between
/// the tracker and the advisor, or across threads.
#[derive(Debug)]
pub struct PatternStore {
    paths: StorePaths,
    tiers: RwLock<Tiers>,
}

impl PatternStore {
    /// An empty store. Call [`PatternStore::load`] to read the tier files.
    pub fn new(paths: StorePaths) -> Self {
        Self {
            paths,
            tiers: RwLock::new(Tiers::default()),
        }
    }

    /// Resolve paths for a project and load both tiers.
    pub fn open(project_root: &Path, settings: &Settings) -> Result<Self, ConfigError> {
        let store = Self::new(StorePaths::resolve(project_root, settings)?);
        store.load();
        Ok(store)
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    fn read(&self) -> RwLockReadGuard<'_, Tiers> {
        self.tiers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tiers> {
        self.tiers.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace in-memory state with both tier files. Missing or corrupt files
    /// load as empty tiers.
    pub fn load(&self) {
        let project = read_tier(&self.paths.project, Tier::Project);
        let global = read_tier(&self.paths.global, Tier::Global);
        let mut tiers = self.write();
        tiers.project = project;
        tiers.global = global;
    }

    /// Persist the global tier.
    pub fn save(&self) -> Result<(), StoreError> {
        let snapshot = self.snapshot(Tier::Global);
        write_tier(&self.paths.global, &snapshot)
    }

    /// Persist the project tier.
    pub fn save_project(&self) -> Result<(), StoreError> {
        let snapshot = self.snapshot(Tier::Project);
        write_tier(&self.paths.project, &snapshot)
    }

    fn snapshot(&self, tier: Tier) -> PatternData {
        let mut tiers = self.write();
        let data = match tier {
            Tier::Project => &mut tiers.project,
            Tier::Global => &mut tiers.global,
        };
        data.last_updated = Utc::now();
        data.version = DATA_VERSION;
        data.clone()
    }

    /// Count one observed transition in the global tier. Blank codes are
    /// refused and `false` is returned.
    pub fn record_sequence(&self, source: &str, target: &str) -> bool {
        if is_blank(source) || is_blank(target) {
            warn!(target: "cascade.store", from = source, to = target, "refusing blank code");
            return false;
        }
        let now = Utc::now();
        let mut tiers = self.write();
        tiers
            .global
            .patterns
            .entry(pattern_key(source, target))
            .and_modify(|p| p.bump(now))
            .or_insert_with(|| FailurePattern::observed(source, target, now));
        debug!(target: "cascade.store", from = source, to = target, "recorded transition");
        true
    }

    /// Insert built-in patterns into the project tier, replacing same keys.
    pub fn insert_project_patterns<I>(&self, patterns: I)
    where
        I: IntoIterator<Item = FailurePattern>,
    {
        let mut tiers = self.write();
        for pattern in patterns {
            tiers.project.patterns.insert(pattern.key(), pattern);
        }
    }

    /// Merged patterns starting at `source` with merged count >= `min_count`.
    pub fn follow_ups(&self, source: &str, min_count: u32) -> Vec<FailurePattern> {
        self.all_patterns()
            .into_values()
            .filter(|p| p.source_code == source && p.count >= min_count)
            .collect()
    }

    /// Merged view of both tiers.
    pub fn all_patterns(&self) -> BTreeMap<String, FailurePattern> {
        let tiers = self.read();
        merge_tiers(&tiers.project.patterns, &tiers.global.patterns)
    }

    /// Copy of a single tier's patterns.
    pub fn patterns_from(&self, tier: Tier) -> BTreeMap<String, FailurePattern> {
        let tiers = self.read();
        match tier {
            Tier::Project => tiers.project.patterns.clone(),
            Tier::Global => tiers.global.patterns.clone(),
        }
    }

    /// Evict global patterns last seen before `now - max_age`.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let cutoff = cutoff(max_age);
        let mut tiers = self.write();
        let before = tiers.global.patterns.len();
        tiers.global.patterns.retain(|_, p| p.last_seen >= cutoff);
        let removed = before - tiers.global.patterns.len();
        if removed > 0 {
            info!(target: "cascade.store", removed, "evicted stale patterns");
        }
        removed
    }

    /// Previous codes stored for a session.
    pub fn session_codes(&self, session_id: &str) -> Option<Vec<String>> {
        self.read()
            .global
            .sessions
            .get(session_id)
            .map(|s| s.codes.clone())
    }

    /// Store `codes` for a session and refresh its timestamp. Empty codes
    /// delete the session instead.
    pub fn set_session_codes(&self, session_id: &str, codes: &[String]) {
        self.replace_session_codes(session_id, codes);
    }

    /// Store `codes` for a session and return what it held before, under a
    /// single write lock. Empty codes delete the session.
    pub fn replace_session_codes(&self, session_id: &str, codes: &[String]) -> Option<Vec<String>> {
        let mut tiers = self.write();
        let previous = if codes.is_empty() {
            tiers.global.sessions.remove(session_id)
        } else {
            tiers.global.sessions.insert(
                session_id.to_string(),
                SessionEntry {
                    codes: codes.to_vec(),
                    last_seen: Utc::now(),
                },
            )
        };
        previous.map(|entry| entry.codes)
    }

    pub fn clear_session(&self, session_id: &str) {
        self.write().global.sessions.remove(session_id);
    }

    /// Copy of every stored session.
    pub fn active_sessions(&self) -> BTreeMap<String, SessionEntry> {
        self.read().global.sessions.clone()
    }

    /// Evict sessions idle since before `now - max_age`.
    pub fn cleanup_sessions(&self, max_age: Duration) -> usize {
        let cutoff = cutoff(max_age);
        let mut tiers = self.write();
        let before = tiers.global.sessions.len();
        tiers.global.sessions.retain(|_, s| s.last_seen >= cutoff);
        let removed = before - tiers.global.sessions.len();
        if removed > 0 {
            info!(target: "cascade.store", removed, "evicted idle sessions");
        }
        removed
    }

    /// Whether the project tier file exists on disk.
    pub fn has_project_data(&self) -> bool {
        self.paths.project.exists()
    }

    pub fn stats(&self) -> StoreStats {
        let tiers = self.read();
        let merged = merge_tiers(&tiers.project.patterns, &tiers.global.patterns);
        StoreStats {
            project_patterns: tiers.project.patterns.len(),
            global_patterns: tiers.global.patterns.len(),
            merged_patterns: merged.len(),
            seed_patterns: merged.values().filter(|p| p.seed).count(),
            active_sessions: tiers.global.sessions.len(),
        }
    }
}

fn is_blank(code: &str) -> bool {
    code.trim().is_empty()
}

fn cutoff(max_age: Duration) -> DateTime<Utc> {
    let age = TimeDelta::from_std(max_age).unwrap_or(TimeDelta::MAX);
    Utc::now()
        .checked_sub_signed(age)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
