//! Behavioural properties of the store, tracker, advisor and bootstrapper,
//! exercised against real tier files.

use cascade_core::{
    bootstrap, Advisor, AdvisorConfig, FailurePattern, PatternStore, SessionTracker, StorePaths,
    Tier, SEED_CASCADES,
};
use chrono::{TimeDelta, Utc};
use filetime::FileTime;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn paths_in(dir: &TempDir) -> StorePaths {
    StorePaths::new(
        dir.path().join("repo/.cascade/patterns.json"),
        dir.path().join("home/global/0123456789abcdef.json"),
    )
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

fn write_json(path: &std::path::Path, value: serde_json::Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn pattern_json(src: &str, tgt: &str, count: u32, first: &str, last: &str) -> serde_json::Value {
    serde_json::json!({
        "source_code": src,
        "target_code": tgt,
        "count": count,
        "first_seen": first,
        "last_seen": last,
        "seed": false
    })
}

// ============================================================================
// Repository
// ============================================================================

#[test]
fn load_of_absent_files_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(paths_in(&dir));
    store.load();
    assert!(store.all_patterns().is_empty());
    assert!(store.active_sessions().is_empty());
}

#[test]
fn corrupt_files_load_as_empty() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    fs::create_dir_all(paths.project.parent().unwrap()).unwrap();
    fs::create_dir_all(paths.global.parent().unwrap()).unwrap();
    fs::write(&paths.project, "not json at all").unwrap();
    fs::write(&paths.global, "{\"patterns\": {\"A->B\": 3}}").unwrap();

    let store = PatternStore::new(paths);
    store.load();
    assert!(store.all_patterns().is_empty());
}

#[test]
fn record_save_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(paths_in(&dir));
    for _ in 0..3 {
        store.record_sequence("A", "B");
    }
    store.save().unwrap();

    let fresh = PatternStore::new(paths_in(&dir));
    fresh.load();
    let all = fresh.all_patterns();
    assert_eq!(all.len(), 1);
    assert_eq!(all["A->B"].count, 3);
    assert!(!fresh.has_project_data());
}

#[test]
fn merge_sums_counts_and_widens_window() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    write_json(
        &paths.project,
        serde_json::json!({
            "patterns": {"A->B": pattern_json("A", "B", 5, "2026-01-01T00:00:00Z", "2026-02-01T00:00:00Z")},
            "version": 1
        }),
    );
    write_json(
        &paths.global,
        serde_json::json!({
            "patterns": {"A->B": pattern_json("A", "B", 2, "2026-01-15T00:00:00Z", "2026-03-01T00:00:00Z")},
            "version": 1
        }),
    );

    let store = PatternStore::new(paths);
    store.load();
    let merged = store.all_patterns();
    let p = &merged["A->B"];
    assert_eq!(p.count, 7);
    assert_eq!(p.first_seen.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    assert_eq!(p.last_seen.to_rfc3339(), "2026-03-01T00:00:00+00:00");
}

#[test]
fn recording_never_writes_project_tier() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(paths_in(&dir));
    store.insert_project_patterns([FailurePattern::seeded("A", "B", 5, Utc::now())]);
    store.record_sequence("A", "B");
    assert_eq!(store.patterns_from(Tier::Project)["A->B"].count, 5);
    assert_eq!(store.patterns_from(Tier::Global)["A->B"].count, 1);
}

#[test]
fn cleanup_evicts_only_stale_global_patterns() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    let old = (Utc::now() - TimeDelta::days(120)).to_rfc3339();
    let recent = (Utc::now() - TimeDelta::days(1)).to_rfc3339();
    write_json(
        &paths.global,
        serde_json::json!({
            "patterns": {
                "A->B": pattern_json("A", "B", 4, &old, &old),
                "C->D": pattern_json("C", "D", 1, &recent, &recent)
            }
        }),
    );
    write_json(
        &paths.project,
        serde_json::json!({
            "patterns": {"E->F": pattern_json("E", "F", 5, &old, &old)}
        }),
    );

    let store = PatternStore::new(paths);
    store.load();
    let max_age = Duration::from_secs(90 * 86_400);
    assert_eq!(store.cleanup(max_age), 1);
    assert_eq!(store.cleanup(max_age), 0);

    let merged = store.all_patterns();
    assert!(!merged.contains_key("A->B"));
    assert!(merged.contains_key("C->D"));
    assert!(merged.contains_key("E->F"));
}

#[test]
fn legacy_sessions_are_migrated_and_expire_first() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    write_json(
        &paths.global,
        serde_json::json!({
            "patterns": {},
            "sessions": {
                "legacy": ["GIT004"],
                "current": {"codes": ["PY001"], "last_seen": Utc::now().to_rfc3339()}
            },
            "version": 1
        }),
    );

    let store = PatternStore::new(paths.clone());
    store.load();
    assert_eq!(store.session_codes("legacy"), Some(codes(&["GIT004"])));
    assert_eq!(store.cleanup_sessions(Duration::from_secs(3_600)), 1);
    assert!(store.session_codes("current").is_some());

    // Saved back in the current shape only.
    store.save().unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.global).unwrap()).unwrap();
    assert!(raw["sessions"]["current"]["codes"].is_array());
    assert!(raw["sessions"].get("legacy").is_none());
}

// ============================================================================
// Session tracker
// ============================================================================

#[test]
fn self_pair_is_suppressed() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(paths_in(&dir));
    let tracker = SessionTracker::new(&store);
    tracker.observe("s", &codes(&["X"]));
    tracker.observe("s", &codes(&["X"]));
    assert!(store.all_patterns().is_empty());
}

#[test]
fn cross_product_is_recorded() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(paths_in(&dir));
    let tracker = SessionTracker::new(&store);
    tracker.observe("s", &codes(&["A", "B"]));
    tracker.observe("s", &codes(&["C"]));

    let all = store.all_patterns();
    assert_eq!(all.len(), 2);
    assert!(all.contains_key("A->C"));
    assert!(all.contains_key("B->C"));
}

#[test]
fn passing_round_severs_the_chain() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(paths_in(&dir));
    let tracker = SessionTracker::new(&store);
    tracker.observe("s", &codes(&["A"]));
    tracker.observe("s", &[]);
    tracker.observe("s", &codes(&["B"]));
    assert!(store.all_patterns().is_empty());
}

#[test]
fn session_state_survives_process_restart() {
    let dir = TempDir::new().unwrap();
    {
        let store = PatternStore::new(paths_in(&dir));
        store.load();
        SessionTracker::new(&store).observe("s", &codes(&["A", "B"]));
        store.save().unwrap();
    }

    let store = PatternStore::new(paths_in(&dir));
    store.load();
    let obs = SessionTracker::new(&store).observe("s", &codes(&["C"]));
    assert_eq!(obs.transitions.len(), 2);
    store.save().unwrap();

    let reread = PatternStore::new(paths_in(&dir));
    reread.load();
    assert_eq!(reread.all_patterns().len(), 2);
    assert_eq!(reread.session_codes("s"), Some(codes(&["C"])));
}

// ============================================================================
// Advisor
// ============================================================================

#[test]
fn advisor_threshold_gates_until_enough_evidence() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(paths_in(&dir));
    let advisor = Advisor::new(&store, AdvisorConfig::new(3, None, None));

    store.record_sequence("A", "B");
    store.record_sequence("A", "B");
    assert!(advisor.advise(&codes(&["A"])).is_empty());

    store.record_sequence("A", "B");
    let hints = advisor.advise(&codes(&["A"]));
    assert_eq!(hints.len(), 1);
    assert!(hints[0].contains("A (A)"));
    assert!(hints[0].contains("B (B)"));
}

#[test]
fn advisor_per_error_cap_picks_higher_count() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(paths_in(&dir));
    for _ in 0..3 {
        store.record_sequence("A", "LOW");
    }
    for _ in 0..5 {
        store.record_sequence("A", "HIGH");
    }
    let advisor = Advisor::new(&store, AdvisorConfig::new(3, Some(1), None));
    let hints = advisor.hints(&codes(&["A"]));
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].target, "HIGH");
}

#[test]
fn seeded_catalog_is_advised_immediately() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(paths_in(&dir));
    assert!(bootstrap(&store).unwrap());

    let advisor = Advisor::new(&store, AdvisorConfig::default());
    let hints = advisor.hints(&codes(&["GIT004"]));
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].target, "GIT005");
    assert!(hints[0].seed);
}

// ============================================================================
// Seed bootstrapper
// ============================================================================

#[test]
fn seeding_twice_does_not_write_again() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(paths_in(&dir));
    assert!(bootstrap(&store).unwrap());

    // User edits the seeded file, then the bootstrapper runs again.
    let project = store.paths().project.clone();
    let edited = r#"{"patterns": {}, "version": 1}"#;
    fs::write(&project, edited).unwrap();
    let stamp = FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_file_mtime(&project, stamp).unwrap();

    let reopened = PatternStore::new(store.paths().clone());
    reopened.load();
    assert!(!bootstrap(&reopened).unwrap());

    let meta = fs::metadata(&project).unwrap();
    assert_eq!(FileTime::from_last_modification_time(&meta), stamp);
    assert_eq!(fs::read_to_string(&project).unwrap(), edited);
    assert!(reopened.patterns_from(Tier::Project).is_empty());
}

#[test]
fn seeded_file_contains_whole_catalog() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(paths_in(&dir));
    bootstrap(&store).unwrap();

    let fresh = PatternStore::new(paths_in(&dir));
    fresh.load();
    let project = fresh.patterns_from(Tier::Project);
    assert_eq!(project.len(), SEED_CASCADES.len());
    assert!(project.values().all(|p| p.seed));
}
