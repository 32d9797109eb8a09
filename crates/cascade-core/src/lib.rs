//! Cascade failure-pattern learning and advisory engine.
//!
//! Observes the blocking validation error codes of consecutive
//! edit/validate rounds, learns which codes tend to follow the fix of
//! another ("cascades"), and turns that history into ranked warnings.
//!
//! - [`store`]: two-tier pattern repository (project seed data + private
//!   per-project learned data), merge, eviction and atomic persistence
//! - [`tracker`]: session tracker turning observations into transitions
//! - [`advisor`]: ranking and formatting of cascade warnings
//! - [`seed`]: first-use bootstrap of the built-in cascade catalog

pub mod advisor;
pub mod cli;
pub mod exit_codes;
pub mod logging;
pub mod seed;
pub mod store;
pub mod tracker;

pub use advisor::{Advisor, AdvisorConfig, Hint};
pub use seed::{bootstrap, SEED_CASCADES, SEED_COUNT};
pub use store::{
    FailurePattern, PatternData, PatternStore, SessionEntry, StoreError, StorePaths, StoreStats,
    Tier,
};
pub use tracker::{Observation, SessionTracker};
