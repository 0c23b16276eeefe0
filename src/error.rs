//! Error types and handling for the Energi Data Service sensor
//!
//! Runtime degradation (empty price data, no price for the current hour, a
//! failed refresh) is logged and never reaches these types. What remains are
//! setup failures: bad configuration, an invalid cost template, an unknown
//! currency pair, and transport errors from the HTTP source.

use thiserror::Error;

/// Result type alias for sensor operations
pub type Result<T> = std::result::Result<T, EdsError>;

/// Main error type
#[derive(Debug, Error)]
pub enum EdsError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Cost template parse or evaluation errors
    #[error("Template error: {message}")]
    Template { message: String },

    /// Currency conversion errors (unknown pair, missing rate)
    #[error("Currency error: {message}")]
    Currency { message: String },

    /// Network-related errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Upstream API errors (bad status, malformed payload)
    #[error("API error: {message}")]
    Api { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl EdsError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        EdsError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        EdsError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(message: S) -> Self {
        EdsError::Template {
            message: message.into(),
        }
    }

    /// Create a new currency error
    pub fn currency<S: Into<String>>(message: S) -> Self {
        EdsError::Currency {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        EdsError::Network {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        EdsError::Api {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        EdsError::Io {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        EdsError::Generic {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for EdsError {
    fn from(err: std::io::Error) -> Self {
        EdsError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for EdsError {
    fn from(err: serde_yaml::Error) -> Self {
        EdsError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for EdsError {
    fn from(err: serde_json::Error) -> Self {
        EdsError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for EdsError {
    fn from(err: reqwest::Error) -> Self {
        EdsError::network(err.to_string())
    }
}

impl From<chrono::ParseError> for EdsError {
    fn from(err: chrono::ParseError) -> Self {
        EdsError::validation("datetime", err.to_string())
    }
}
