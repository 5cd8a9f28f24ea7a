//! Unified error types and the crate-wide `Result` alias.
//!
//! Recoverable user-level outcomes (unresolved period phrase, nothing to
//! delete) are modeled as ordinary return types in `core`, not as errors,
//! and HTTP collaborator failures are logged where they happen. Everything
//! here is an actual failure the caller must handle.

use thiserror::Error;

/// All failure modes of the application.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration, typically an unset environment variable
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what is misconfigured
        message: String,
    },

    /// Any database failure surfaced by SeaORM
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Malformed JSON from an external collaborator
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error, e.g. binding the listen socket
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
