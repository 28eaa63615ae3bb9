//! Engine and storage error types.
//!
//! Defined in `compass-core` so the `StateStore` trait can name them and
//! adapter crates construct them without a dependency cycle.

use thiserror::Error;

/// Failure raised by a [`crate::traits::StateStore`] adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying key-value backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by the session engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A Likert value outside the 1..=5 scale.
    #[error("response value {0} is outside the 1..=5 Likert range")]
    InvalidResponseValue(u8),

    /// A checkpoint write failed in the storage backend.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A checkpoint could not be serialized.
    #[error("failed to serialize session checkpoint: {0}")]
    Serialization(#[from] serde_json::Error),
}
