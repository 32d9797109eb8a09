//! Persisted data model.

use cascade_common::DATA_VERSION;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity key of a directed code pair.
pub fn pattern_key(source: &str, target: &str) -> String {
    format!("{source}->{target}")
}

/// Which of the two independent stores an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Seed/shared data kept under the project root.
    Project,
    /// Learned data kept privately per machine and project.
    Global,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Global => write!(f, "global"),
        }
    }
}

/// A directed edge "source code → target code" with occurrence statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FailurePattern {
    pub source_code: String,
    pub target_code: String,
    /// Times the transition was observed. Never zero.
    pub count: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Built-in entry rather than a learned one.
    #[serde(default)]
    pub seed: bool,
}

impl FailurePattern {
    /// First observation of a transition.
    pub fn observed(source: &str, target: &str, now: DateTime<Utc>) -> Self {
        Self {
            source_code: source.to_string(),
            target_code: target.to_string(),
            count: 1,
            first_seen: now,
            last_seen: now,
            seed: false,
        }
    }

    /// Built-in cascade with a fixed count.
    pub fn seeded(source: &str, target: &str, count: u32, now: DateTime<Utc>) -> Self {
        Self {
            count,
            seed: true,
            ..Self::observed(source, target, now)
        }
    }

    pub fn key(&self) -> String {
        pattern_key(&self.source_code, &self.target_code)
    }

    /// Record one more observation.
    pub fn bump(&mut self, now: DateTime<Utc>) {
        self.count = self.count.saturating_add(1);
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    fn is_valid(&self) -> bool {
        self.count > 0 && !self.source_code.is_empty() && !self.target_code.is_empty()
    }
}

/// Most recently observed blocking codes of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SessionEntry {
    pub codes: Vec<String>,
    /// Epoch for entries migrated from the legacy shape, so they expire first.
    #[serde(default)]
    pub last_seen: DateTime<Utc>,
}

/// Session value as found on disk: current object, or legacy bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum SessionRecord {
    Legacy(Vec<String>),
    Current(SessionEntry),
}

impl From<SessionRecord> for SessionEntry {
    fn from(record: SessionRecord) -> Self {
        match record {
            SessionRecord::Legacy(codes) => SessionEntry {
                codes,
                last_seen: DateTime::<Utc>::UNIX_EPOCH,
            },
            SessionRecord::Current(entry) => entry,
        }
    }
}

fn deserialize_sessions<'de, D>(deserializer: D) -> Result<BTreeMap<String, SessionEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, SessionRecord>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(id, record)| (id, SessionEntry::from(record)))
        .collect())
}

fn default_version() -> u32 {
    DATA_VERSION
}

/// One persisted tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PatternData {
    /// Patterns by [`pattern_key`].
    #[serde(default)]
    pub patterns: BTreeMap<String, FailurePattern>,

    /// Previous blocking codes by session id.
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "deserialize_sessions"
    )]
    #[schemars(with = "BTreeMap<String, SessionEntry>")]
    pub sessions: BTreeMap<String, SessionEntry>,

    #[serde(default)]
    pub last_updated: DateTime<Utc>,

    #[serde(default = "default_version")]
    pub version: u32,
}

impl Default for PatternData {
    fn default() -> Self {
        Self {
            patterns: BTreeMap::new(),
            sessions: BTreeMap::new(),
            last_updated: DateTime::<Utc>::UNIX_EPOCH,
            version: DATA_VERSION,
        }
    }
}

impl PatternData {
    /// Parse a tier file and enforce the in-memory invariants.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let mut data: Self = serde_json::from_str(raw)?;
        data.normalize();
        Ok(data)
    }

    /// Drop entries that must never exist: zero counts, empty codes, and
    /// patterns stored under a key that does not match their codes.
    pub fn normalize(&mut self) {
        self.patterns.retain(|key, p| p.is_valid() && *key == p.key());
        for p in self.patterns.values_mut() {
            if p.first_seen > p.last_seen {
                p.first_seen = p.last_seen;
            }
        }
        self.sessions.retain(|_, s| !s.codes.is_empty());
    }
}
