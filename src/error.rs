//! # Source Connector Error Types
//!
//! Structured error handling for source construction, descriptor resolution,
//! and batched iteration, using thiserror for typed variants instead of
//! `Box<dyn Error>` patterns.
//!
//! Construction-time validation failures (`InvalidArgument`) are fatal to the
//! source definition and never retried. Resolution failures during descriptor
//! reconstruction (`UnresolvedModel`, `UnresolvedScope`) surface immediately
//! to the caller; nothing is silently defaulted.

use thiserror::Error;

/// Errors surfaced by the source connector
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Invalid source argument: {message}")]
    InvalidArgument { message: String },

    #[error("Unresolved model class: {model_class}")]
    UnresolvedModel { model_class: String },

    #[error("Unresolved scope: {model_class}.{scope_name}")]
    UnresolvedScope {
        model_class: String,
        scope_name: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Descriptor serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SourceError {
    /// Convenience constructor for construction-time validation failures
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Convenience constructor for configuration failures
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
