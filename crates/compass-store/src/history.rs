//! Bounded history of completed assessment results.
//!
//! Client-side log: newest first, capped at [`MAX_RESULTS`] entries with
//! tail eviction. Reads are best-effort; writes propagate storage failures
//! so the caller sees a lost write instead of silently missing history.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use compass_core::error::StorageError;
use compass_core::model::{CareerField, CareerScores, GradeLevel};
use compass_core::traits::StateStore;

/// Fixed storage key for the serialized result list.
pub const HISTORY_KEY: &str = "@careercompass_history";

/// Maximum entries retained; saving past this evicts the oldest.
pub const MAX_RESULTS: usize = 50;

/// Errors surfaced by history writes.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The storage backend refused the write.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The result list could not be serialized.
    #[error("failed to serialize history: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One completed assessment, immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResult {
    /// Store-assigned unique id.
    pub id: String,
    /// Unix millis when the result was saved.
    pub timestamp: i64,
    pub level: GradeLevel,
    pub scores: CareerScores,
    pub top_career: CareerField,
    pub top_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

/// A result as handed in by the caller; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct ResultDraft {
    pub level: GradeLevel,
    pub scores: CareerScores,
    pub top_career: CareerField,
    pub top_score: u8,
    pub nickname: Option<String>,
    pub grade: Option<String>,
}

impl ResultDraft {
    /// Draft a result straight from computed scores, deriving the top field.
    pub fn from_scores(level: GradeLevel, scores: CareerScores) -> Self {
        let (top_career, top_score) = scores.top();
        Self {
            level,
            scores,
            top_career,
            top_score,
            nickname: None,
            grade: None,
        }
    }
}

/// The bounded, newest-first result history.
pub struct HistoryStore {
    store: Arc<dyn StateStore>,
    results: Vec<SavedResult>,
}

impl HistoryStore {
    /// Create an empty store over a storage backend. Call
    /// [`Self::load_history`] to pull previously persisted results.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            results: Vec::new(),
        }
    }

    /// Best-effort load: read, parse, and re-sort newest-first. On any
    /// storage or parse failure the prior in-memory state is kept and the
    /// failure is logged.
    pub async fn load_history(&mut self) {
        let stored = match self.store.get(HISTORY_KEY).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("failed to load history: {e}");
                return;
            }
        };
        match serde_json::from_str::<Vec<SavedResult>>(&stored) {
            Ok(mut results) => {
                // The list is written newest-first, but re-sort defensively.
                results.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
                self.results = results;
            }
            Err(e) => {
                tracing::warn!("failed to parse history, keeping in-memory state: {e}");
            }
        }
    }

    /// Persist a completed result. Assigns a unique id and the current
    /// timestamp, prepends the entry, evicts past [`MAX_RESULTS`] from the
    /// tail, and writes the whole list. Returns the created entry.
    ///
    /// On a storage failure the error propagates and in-memory state is
    /// left unchanged.
    pub async fn save_result(&mut self, draft: ResultDraft) -> Result<SavedResult, HistoryError> {
        let result = SavedResult {
            id: format!("result_{}", Uuid::new_v4()),
            timestamp: Utc::now().timestamp_millis(),
            level: draft.level,
            scores: draft.scores,
            top_career: draft.top_career,
            top_score: draft.top_score,
            nickname: draft.nickname,
            grade: draft.grade,
        };

        let mut updated = Vec::with_capacity((self.results.len() + 1).min(MAX_RESULTS));
        updated.push(result.clone());
        updated.extend(self.results.iter().take(MAX_RESULTS - 1).cloned());

        self.persist(&updated).await?;
        self.results = updated;
        Ok(result)
    }

    /// Remove one result by id, persisting the filtered list.
    pub async fn delete_result(&mut self, id: &str) -> Result<(), HistoryError> {
        let updated: Vec<SavedResult> = self
            .results
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();

        self.persist(&updated).await?;
        self.results = updated;
        Ok(())
    }

    /// Drop every result and remove the storage key.
    pub async fn clear_history(&mut self) -> Result<(), HistoryError> {
        self.store.remove(HISTORY_KEY).await?;
        self.results.clear();
        Ok(())
    }

    /// In-memory lookup by id; never touches storage.
    pub fn get_result_by_id(&self, id: &str) -> Option<&SavedResult> {
        self.results.iter().find(|r| r.id == id)
    }

    /// Current results, newest first.
    pub fn results(&self) -> &[SavedResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    async fn persist(&self, results: &[SavedResult]) -> Result<(), HistoryError> {
        let json = serde_json::to_string(results)?;
        self.store.set(HISTORY_KEY, &json).await?;
        Ok(())
    }
}

/// Format a result timestamp as `YYYY.MM.DD HH:MM` (local display format of
/// the history screen).
pub fn format_timestamp(timestamp: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp).single() {
        Some(dt) => dt.format("%Y.%m.%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// Title line for a history entry: nickname, grade (or level label), date.
pub fn format_result_title(result: &SavedResult) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(nickname) = &result.nickname {
        parts.push(nickname.clone());
    }

    match &result.grade {
        Some(grade) => parts.push(grade.clone()),
        None => parts.push(result.level.label().to_string()),
    }

    parts.push(format_timestamp(result.timestamp));
    parts.join(" · ")
}
