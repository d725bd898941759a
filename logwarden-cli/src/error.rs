//! CLI-specific error types and exit code mapping

use logwarden_core::error::LogwardenError;
use logwarden_filter::FilterError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logwarden-core.
    #[error("{0}")]
    Core(#[from] LogwardenError),

    /// Rule engine domain error.
    #[error("rule error: {0}")]
    Rule(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                  |
    /// |------|--------------------------|
    /// | 0    | Success                  |
    /// | 1    | General / command error  |
    /// | 2    | Configuration error      |
    /// | 10   | IO error                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Rule(_) => 1,
        }
    }
}

impl From<FilterError> for CliError {
    fn from(e: FilterError) -> Self {
        Self::Rule(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_config_error() {
        let err = CliError::Config("bad toml".to_owned());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn exit_code_rule_error() {
        let err = CliError::Rule("invalid rule".to_owned());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn filter_error_maps_to_rule_variant() {
        let err: CliError = FilterError::FileNotFound {
            path: "/missing".to_owned(),
        }
        .into();
        assert!(matches!(err, CliError::Rule(_)));
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn core_error_display_passes_through() {
        use logwarden_core::error::ConfigError;
        let core = LogwardenError::Config(ConfigError::FileNotFound {
            path: "logwarden.toml".to_owned(),
        });
        let err: CliError = core.into();
        assert!(err.to_string().contains("logwarden.toml"));
    }
}
