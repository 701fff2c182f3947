//! Unified error handling for the execution monitor
//!
//! The analytics core is total over degenerate data: empty or sparse event
//! sets resolve to zero-valued metrics and empty anomaly lists. Errors are
//! reserved for malformed arguments and for the I/O around the core.

use std::fmt;
use std::io;

use crate::config::ConfigError;

/// Main error type for the execution monitor
#[derive(Debug)]
pub enum AnalyticsError {
    // Argument errors
    EmptyInput(String),
    InvalidParameter(String, String), // (parameter_name, reason)
    StrategyNotFound(String),

    // Configuration errors
    Config(ConfigError),

    // IO errors
    FileNotFound(String),
    FileRead(String),
    FileWrite(String),
    Serialization(String),
}

impl AnalyticsError {
    /// Get a user-friendly error message with helpful context
    pub fn user_message(&self) -> String {
        match self {
            AnalyticsError::FileNotFound(path) => {
                format!(
                    "File not found: {}\n\n\
                    💡 Quick fix:\n\
                    1. Run: exec-monitor generate --output {}\n\
                    2. Or point --events at an existing snapshot",
                    path, path
                )
            }
            AnalyticsError::StrategyNotFound(id) => {
                format!(
                    "Strategy not found: {}\n\n\
                    💡 List known strategies with: exec-monitor report",
                    id
                )
            }
            AnalyticsError::InvalidParameter(name, reason) => {
                format!(
                    "Invalid value for '{}': {}\n\n\
                    💡 Simulation limits must be positive and rates within [0, 1]",
                    name, reason
                )
            }
            AnalyticsError::Config(err) => {
                format!(
                    "Configuration error: {}\n\n\
                    💡 Run: exec-monitor init to write a default config",
                    err
                )
            }
            _ => self.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AnalyticsError::EmptyInput(_)
            | AnalyticsError::InvalidParameter(_, _)
            | AnalyticsError::StrategyNotFound(_) => "input",
            AnalyticsError::Config(_) => "config",
            AnalyticsError::FileNotFound(_)
            | AnalyticsError::FileRead(_)
            | AnalyticsError::FileWrite(_)
            | AnalyticsError::Serialization(_) => "io",
        }
    }
}

impl fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyticsError::EmptyInput(what) => write!(f, "Empty input: {}", what),
            AnalyticsError::InvalidParameter(name, reason) => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            AnalyticsError::StrategyNotFound(id) => write!(f, "Strategy not found: {}", id),
            AnalyticsError::Config(err) => write!(f, "{}", err),
            AnalyticsError::FileNotFound(path) => write!(f, "File not found: {}", path),
            AnalyticsError::FileRead(msg) => write!(f, "Failed to read file: {}", msg),
            AnalyticsError::FileWrite(msg) => write!(f, "Failed to write file: {}", msg),
            AnalyticsError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for AnalyticsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalyticsError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AnalyticsError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => AnalyticsError::FileNotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => {
                AnalyticsError::FileWrite(format!("Permission denied: {}", err))
            }
            _ => AnalyticsError::FileRead(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        AnalyticsError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for AnalyticsError {
    fn from(err: toml::de::Error) -> Self {
        AnalyticsError::Config(ConfigError::Parse(err.to_string()))
    }
}

impl From<ConfigError> for AnalyticsError {
    fn from(err: ConfigError) -> Self {
        AnalyticsError::Config(err)
    }
}

/// Result type alias using AnalyticsError
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalyticsError::EmptyInput("scenarios".to_string());
        assert!(err.to_string().contains("scenarios"));
    }

    #[test]
    fn test_error_category() {
        let err = AnalyticsError::InvalidParameter("min_fill_rate".into(), "above 1".into());
        assert_eq!(err.category(), "input");

        let err = AnalyticsError::Config(ConfigError::Validation("bad".into()));
        assert_eq!(err.category(), "config");

        let err = AnalyticsError::FileRead("test".into());
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_user_message() {
        let err = AnalyticsError::StrategyNotFound("S9".to_string());
        let msg = err.user_message();
        assert!(msg.contains("S9"));
        assert!(msg.contains("💡"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: AnalyticsError = io_err.into();
        assert!(matches!(err, AnalyticsError::FileNotFound(_)));
    }

    #[test]
    fn test_json_conversion() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: AnalyticsError = json_err.into();
        assert_eq!(err.category(), "io");
    }
}
