//! # AppError
//!
//! Centralized error handling for the food rescue store.
//! There is no not-found variant: missing ids are reported through
//! [`crate::commands::Outcome`] instead.

use thiserror::Error;

/// The primary error type for all fr-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid input to a write operation (e.g. zero quantity, blank donor name).
    /// Raised before any mutation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Storage read or write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// State could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Infrastructure failure that is not plain I/O (e.g. a poisoned lock).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// True for failures that happened while persisting, after the in-memory
    /// mutation was already applied.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Serialization(_) | Self::Internal(_))
    }
}

/// A specialized Result type for food rescue logic.
pub type Result<T> = std::result::Result<T, AppError>;
