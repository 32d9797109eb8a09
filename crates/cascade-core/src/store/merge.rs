//! Merged view over the project and global tiers.

use super::types::FailurePattern;
use std::collections::BTreeMap;

/// Merge the two tiers into a fresh map.
///
/// Keys present in both tiers get summed counts, the earlier `first_seen`
/// and the later `last_seen`; the project entry's `seed` flag is kept.
/// Keys present in one tier are copied as-is. The result never aliases
/// either input.
pub fn merge_tiers(
    project: &BTreeMap<String, FailurePattern>,
    global: &BTreeMap<String, FailurePattern>,
) -> BTreeMap<String, FailurePattern> {
    let mut merged = project.clone();
    for (key, learned) in global {
        match merged.get_mut(key) {
            Some(entry) => {
                entry.count = entry.count.saturating_add(learned.count);
                entry.first_seen = entry.first_seen.min(learned.first_seen);
                entry.last_seen = entry.last_seen.max(learned.last_seen);
            }
            None => {
                merged.insert(key.clone(), learned.clone());
            }
        }
    }
    merged
}
