//! Error types for pluglog
//!
//! This module defines the error taxonomy shared by the construction pipeline,
//! the logger contract and every backend. Construction-time failures are
//! always reported as configuration errors; call-time failures are logging
//! errors that only the exception-safety decorator is allowed to swallow.

use thiserror::Error;

/// Main error type for pluglog operations
#[derive(Error, Debug)]
pub enum LogError {
    /// Configuration missing or invalid, backend unresolvable, construction failed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid log level name in configuration
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    ConfigFileMissing(String),

    /// TOML parsing errors
    #[error("TOML parsing error: {source}")]
    TomlError {
        #[from]
        source: toml::de::Error,
    },

    /// JSON (de)serialization errors
    #[error("Serialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    /// The backend sink rejected or could not record a message
    #[error("Logging error: {0}")]
    LoggingError(String),

    /// Template/argument mismatch during placeholder substitution
    #[error("Message formatting error: {0}")]
    MessageFormattingError(String),

    /// I/O errors raised by a backend while writing
    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    /// Contract violation by the caller
    #[error("Invalid argument: {0}")]
    ArgumentError(String),

    /// Named message identifier not registered on the logger
    #[error("Unknown named message: {0}")]
    UnknownMessage(String),
}

/// Result type alias for pluglog operations
pub type Result<T> = std::result::Result<T, LogError>;

impl LogError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new logging error
    pub fn logging<S: Into<String>>(msg: S) -> Self {
        Self::LoggingError(msg.into())
    }

    /// Create a new message formatting error
    pub fn formatting<S: Into<String>>(msg: S) -> Self {
        Self::MessageFormattingError(msg.into())
    }

    /// Create a new argument error
    pub fn argument<S: Into<String>>(msg: S) -> Self {
        Self::ArgumentError(msg.into())
    }

    /// Whether this error belongs to the configuration family.
    pub fn is_config_error(&self) -> bool {
        self.category() == "config"
    }

    /// Whether this error is a call-time sink failure.
    ///
    /// Formatting errors count as logging failures.
    pub fn is_logging_failure(&self) -> bool {
        matches!(
            self,
            Self::LoggingError(_) | Self::MessageFormattingError(_) | Self::IoError { .. }
        )
    }

    /// Whether this error is a caller contract violation.
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::ArgumentError(_) | Self::UnknownMessage(_))
    }

    /// Convert a construction-time failure into a configuration error.
    ///
    /// Errors that are already in the configuration family are kept as-is so
    /// the original variant (e.g. `InvalidLogLevel`) stays matchable.
    pub fn into_config(self, context: &str) -> Self {
        if self.is_config_error() {
            self
        } else {
            Self::ConfigError(format!("{}: {}", context, self))
        }
    }

    /// Get the error category for logging purposes
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigError(_)
            | Self::InvalidLogLevel(_)
            | Self::ConfigFileMissing(_)
            | Self::TomlError { .. } => "config",
            Self::SerializationError { .. } => "serialization",
            Self::LoggingError(_) | Self::IoError { .. } => "logging",
            Self::MessageFormattingError(_) => "formatting",
            Self::ArgumentError(_) | Self::UnknownMessage(_) => "argument",
        }
    }
}
