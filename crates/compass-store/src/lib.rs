//! compass-store — Storage adapters and result history.
//!
//! Implements the `StateStore` port from `compass-core` for in-memory and
//! file-backed key-value storage, and provides the bounded history of
//! completed assessment results on top of it.

pub mod file;
pub mod history;
pub mod memory;

pub use file::FileStore;
pub use history::{HistoryError, HistoryStore, ResultDraft, SavedResult, HISTORY_KEY, MAX_RESULTS};
pub use memory::MemoryStore;
