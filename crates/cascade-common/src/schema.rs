//! On-disk schema versioning.

/// Version written into every pattern data file.
///
/// Bump when a field is removed or changes type. Additive fields keep the
/// version; readers ignore unknown fields and default missing ones.
pub const DATA_VERSION: u32 = 1;

/// Check if a data file version can be read by this build.
///
/// A file without a `version` field reads as the current version. Newer
/// versions are still read but logged.
pub fn is_compatible(version: u32) -> bool {
    version <= DATA_VERSION
}
