//! Port definitions for question catalogs and key-value persistence.
//!
//! `compass-store` provides the concrete `StateStore` adapters; the engine
//! and history store never branch on the storage platform themselves.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::model::{GradeLevel, Question};

/// Async key-value storage port.
///
/// Values are JSON strings; the engine uses one fixed key for the in-flight
/// session checkpoint and the history store uses another for the bounded
/// result list. Web local storage, device storage, and test doubles all sit
/// behind this same trait.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the value at `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` at `key`, overwriting any prior value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Source of the ordered question list for a grade level.
pub trait QuestionBank: Send + Sync {
    /// The ordered question list for `level`. The order returned here is the
    /// order the session presents them in.
    fn questions_by_level(&self, level: GradeLevel) -> Vec<Question>;
}
