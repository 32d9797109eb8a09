//! Cascade advisor.
//!
//! Turns the currently blocking codes into warnings about what fixing them
//! is likely to surface next, strongest evidence first.

use crate::store::{FailurePattern, PatternStore};
use cascade_common::codes;
use cascade_config::Settings;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Thresholds and caps for advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvisorConfig {
    /// Minimum merged count for a cascade to be advised on.
    pub min_count: u32,
    /// Warnings per input code. `None` is unlimited.
    pub max_per_error: Option<usize>,
    /// Warnings across all input codes. `None` is unlimited.
    pub max_total: Option<usize>,
}

impl AdvisorConfig {
    /// A cap of zero is treated as no cap.
    pub fn new(min_count: u32, max_per_error: Option<usize>, max_total: Option<usize>) -> Self {
        Self {
            min_count,
            max_per_error: max_per_error.filter(|n| *n > 0),
            max_total: max_total.filter(|n| *n > 0),
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for AdvisorConfig {
    fn from(settings: &Settings) -> Self {
        Self::new(settings.min_count, settings.max_per_error, settings.max_total)
    }
}

/// One cascade warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hint {
    pub source: String,
    pub source_label: String,
    pub target: String,
    pub target_label: String,
    pub count: u32,
    pub seed: bool,
}

impl From<FailurePattern> for Hint {
    fn from(p: FailurePattern) -> Self {
        Self {
            source_label: codes::label(&p.source_code).to_string(),
            target_label: codes::label(&p.target_code).to_string(),
            source: p.source_code,
            target: p.target_code,
            count: p.count,
            seed: p.seed,
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fixing {} ({}) often surfaces {} ({}) next (seen {} times).",
            self.source, self.source_label, self.target, self.target_label, self.count
        )
    }
}

/// Read-only view over a store that produces hints.
pub struct Advisor<'a> {
    store: &'a PatternStore,
    config: AdvisorConfig,
}

impl<'a> Advisor<'a> {
    pub fn new(store: &'a PatternStore, config: AdvisorConfig) -> Self {
        Self { store, config }
    }

    /// Ranked, capped hints for the given codes, in input-code order.
    pub fn hints(&self, codes: &[String]) -> Vec<Hint> {
        let mut hints = Vec::new();
        let total_cap = self.config.max_total.unwrap_or(usize::MAX);

        'codes: for code in codes {
            let mut follow_ups = self.store.follow_ups(code, self.config.min_count);
            follow_ups.sort_by(|a, b| {
                b.count
                    .cmp(&a.count)
                    .then_with(|| a.target_code.cmp(&b.target_code))
            });
            let per_code = self.config.max_per_error.unwrap_or(usize::MAX);
            for pattern in follow_ups.into_iter().take(per_code) {
                if hints.len() >= total_cap {
                    break 'codes;
                }
                hints.push(Hint::from(pattern));
            }
        }

        debug!(
            target: "cascade.advisor",
            codes = codes.len(),
            hints = hints.len(),
            min_count = self.config.min_count,
            "advised"
        );
        hints
    }

    /// Hints rendered as one sentence each.
    pub fn advise(&self, codes: &[String]) -> Vec<String> {
        if codes.is_empty() {
            return Vec::new();
        }
        self.hints(codes).iter().map(Hint::to_string).collect()
    }
}
