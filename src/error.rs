//! Error types and handling for Gridfeed
//!
//! Scheduling itself never fails: the fetch units report anomalies as log
//! diagnostics. The errors here come from configuration, logging setup and
//! parsing of textual enum values.

use thiserror::Error;

/// Result type alias for Gridfeed operations
pub type Result<T> = std::result::Result<T, GridFeedError>;

/// Main error type for Gridfeed
#[derive(Debug, Error)]
pub enum GridFeedError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl GridFeedError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        GridFeedError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        GridFeedError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        GridFeedError::Serialization {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        GridFeedError::Io {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for GridFeedError {
    fn from(err: std::io::Error) -> Self {
        GridFeedError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for GridFeedError {
    fn from(err: serde_yaml::Error) -> Self {
        GridFeedError::serialization(err.to_string())
    }
}

impl From<serde_json::Error> for GridFeedError {
    fn from(err: serde_json::Error) -> Self {
        GridFeedError::serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for GridFeedError {
    fn from(err: chrono::ParseError) -> Self {
        GridFeedError::validation("datetime", err.to_string())
    }
}
