//! Cascade configuration loading and resolution.
//!
//! This crate provides:
//! - The typed `Settings` struct for advisor thresholds and eviction ages
//! - Config resolution (CLI → env → config file → defaults)
//! - Storage path helpers: `~/` expansion and per-project global file naming

pub mod paths;
pub mod resolve;
pub mod settings;

pub use paths::{absolute_root, expand_home, global_file, project_hash};
pub use resolve::{resolve_settings, ConfigError, Overrides};
pub use settings::{days, hours, Settings};

/// Config file looked up under the project root when none is given.
pub const DEFAULT_CONFIG_FILE: &str = ".cascade/config.json";
