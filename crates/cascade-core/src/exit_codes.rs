//! Exit codes for the cascade CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.
//! Hook scripts branch on these, so they are stable.

use cascade_common::Error;

/// Exit codes for cascade operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Clean / nothing to report
    Clean = 0,

    /// `advise` produced at least one hint
    HintsAvailable = 1,

    /// Configuration error
    ConfigError = 10,

    /// I/O error writing pattern data
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a failed command.
    pub fn from_error(err: &Error) -> Self {
        match err {
            e if e.is_config() => ExitCode::ConfigError,
            Error::Persist { .. } | Error::Io(_) | Error::Json(_) => ExitCode::IoError,
            _ => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_stable_values() {
        assert_eq!(ExitCode::Clean.as_i32(), 0);
        assert_eq!(ExitCode::HintsAvailable.as_i32(), 1);
        assert_eq!(ExitCode::ConfigError.as_i32(), 10);
        assert_eq!(ExitCode::IoError.as_i32(), 13);
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ExitCode::from_error(&Error::Config("x".to_string())),
            ExitCode::ConfigError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Persist {
                path: PathBuf::from("/x"),
                source: std::io::Error::other("denied"),
            }),
            ExitCode::IoError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Io(std::io::Error::other("disk"))),
            ExitCode::IoError
        );
    }
}
