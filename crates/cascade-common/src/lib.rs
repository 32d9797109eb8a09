//! Cascade common types and errors.
//!
//! This crate provides foundational types shared across cascade crates:
//! - The unified error type
//! - The static catalog of validation error codes and their labels
//! - On-disk schema versioning
//! - Output format selection

pub mod codes;
pub mod error;
pub mod output;
pub mod schema;

pub use codes::{describe, label};
pub use error::{Error, Result};
pub use output::OutputFormat;
pub use schema::DATA_VERSION;
