//! Session tracker.
//!
//! Correlates consecutive validation rounds of one session: every code that
//! was blocking in the previous round is paired with every code blocking
//! now, and each pair is recorded as a transition. A round with no blocking
//! codes ends the chain.
//!
//! Previous codes live only in the store's session map, so session eviction
//! on the store is seen by the next observation and a later process
//! rebuilds the same state from disk.

use crate::store::PatternStore;
use serde::Serialize;
use tracing::debug;

/// What a single `observe` call did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub session_id: String,
    /// Recorded `(previous, current)` transitions, in recording order.
    pub transitions: Vec<(String, String)>,
    /// The observation had no codes and ended the session's history.
    pub cleared: bool,
}

/// Tracks the last blocking codes per session.
pub struct SessionTracker<'a> {
    store: &'a PatternStore,
}

impl<'a> SessionTracker<'a> {
    pub fn new(store: &'a PatternStore) -> Self {
        Self { store }
    }

    /// Record the blocking codes of one validation round. Blank codes are
    /// ignored; a round with nothing else counts as passed.
    pub fn observe(&self, session_id: &str, codes: &[String]) -> Observation {
        let codes = clean_codes(codes);
        let previous = self.store.replace_session_codes(session_id, &codes);

        let mut observation = Observation {
            session_id: session_id.to_string(),
            cleared: codes.is_empty(),
            ..Observation::default()
        };
        if let Some(prev) = previous.filter(|_| !codes.is_empty()) {
            observation.transitions = cross_pairs(&prev, &codes);
        }
        for (from, to) in &observation.transitions {
            self.store.record_sequence(from, to);
        }

        debug!(
            target: "cascade.tracker",
            session = session_id,
            codes = codes.len(),
            recorded = observation.transitions.len(),
            cleared = observation.cleared,
            "observed round"
        );
        observation
    }

    /// Forget the previous codes of a session.
    pub fn clear_session(&self, session_id: &str) {
        self.store.clear_session(session_id);
    }

    /// Ids of sessions with stored previous codes, sorted.
    pub fn active_sessions(&self) -> Vec<String> {
        self.store.active_sessions().into_keys().collect()
    }
}

/// Trimmed codes with blanks removed.
fn clean_codes(codes: &[String]) -> Vec<String> {
    codes
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every `(p, c)` with `p` from `previous` and `c` from `current`, skipping
/// self-transitions.
fn cross_pairs(previous: &[String], current: &[String]) -> Vec<(String, String)> {
    previous
        .iter()
        .flat_map(|p| {
            current
                .iter()
                .filter(move |c| *c != p)
                .map(move |c| (p.clone(), c.clone()))
        })
        .collect()
}
