//! The assessment session engine.
//!
//! Owns one in-flight assessment: the question snapshot for the chosen
//! level, the collected responses, the cursor (question index + stage), and
//! the derived completion/score state. Mutations are synchronous; the only
//! suspension points are the checkpoint operations against the injected
//! [`StateStore`]. The engine takes `&mut self` for every mutation, so a
//! multi-threaded host has to serialize access through a single owner.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::GradeLevelConfig;
use crate::error::EngineError;
use crate::model::{CareerScores, GradeLevel, Question, Response, ResponseValue};
use crate::scoring::calculate_scores;
use crate::traits::{QuestionBank, StateStore};

/// Fixed storage key for the in-flight session checkpoint.
pub const SAVED_ASSESSMENT_KEY: &str = "@careercompass_saved_assessment";

/// Serialized snapshot of an in-progress session, written wholesale on every
/// [`SessionEngine::save_progress`] call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAssessmentState {
    pub level: GradeLevel,
    pub responses: Vec<Response>,
    pub current_question_index: usize,
    pub current_stage: u32,
    pub session_id: String,
    /// Unix millis when the original session started.
    pub started_at: i64,
    /// Unix millis when this checkpoint was written.
    pub saved_at: i64,
}

impl SavedAssessmentState {
    /// Whether the cursor fields respect the invariants of the checkpoint's
    /// own level config (`1 <= current_stage <= total_stages`, question
    /// index inside the level's question range).
    ///
    /// Checkpoints live in user-editable storage (local storage, plain
    /// files), so a structurally valid JSON document can still carry an
    /// out-of-range cursor.
    pub fn is_within_level_bounds(&self) -> bool {
        let config = GradeLevelConfig::for_level(self.level);
        (1..=config.total_stages).contains(&self.current_stage)
            && self.current_question_index < config.total_questions as usize
    }
}

/// Progress through the staged question sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageProgress {
    /// 1-based position across the whole assessment.
    pub current: usize,
    /// Total question count (`questions_per_stage * total_stages`).
    pub total: usize,
    /// 1-based position within the current stage, clamped into
    /// `1..=questions_per_stage`.
    pub stage_question_index: usize,
}

/// The stateful assessment session engine.
pub struct SessionEngine {
    bank: Arc<dyn QuestionBank>,
    store: Arc<dyn StateStore>,

    level: GradeLevel,
    questions: Vec<Question>,
    responses: Vec<Response>,

    current_question_index: usize,
    current_stage: u32,
    total_stages: u32,
    questions_per_stage: u32,

    session_id: Option<String>,
    started_at: Option<i64>,
    is_completed: bool,
    scores: Option<CareerScores>,
}

impl SessionEngine {
    /// Create an engine in its zero state. [`SessionEngine::init_assessment`]
    /// must run before questions can be answered.
    pub fn new(bank: Arc<dyn QuestionBank>, store: Arc<dyn StateStore>) -> Self {
        Self {
            bank,
            store,
            level: GradeLevel::ElementaryLower,
            questions: Vec::new(),
            responses: Vec::new(),
            current_question_index: 0,
            current_stage: 1,
            total_stages: 5,
            questions_per_stage: 7,
            session_id: None,
            started_at: None,
            is_completed: false,
            scores: None,
        }
    }

    /// Start a fresh assessment at `level`, discarding any in-progress
    /// session state entirely.
    pub fn init_assessment(&mut self, level: GradeLevel) {
        let config = GradeLevelConfig::for_level(level);
        let session_id = format!("session_{}", Uuid::new_v4());

        self.level = level;
        self.questions = self.bank.questions_by_level(level);
        self.responses = Vec::new();
        self.current_question_index = 0;
        self.current_stage = 1;
        self.total_stages = config.total_stages;
        self.questions_per_stage = config.questions_per_stage;
        self.session_id = Some(session_id);
        self.started_at = Some(Utc::now().timestamp_millis());
        self.is_completed = false;
        self.scores = None;

        tracing::debug!(%level, questions = self.questions.len(), "assessment initialized");
    }

    /// Record a response for the current question.
    ///
    /// Upserts by question id: re-answering replaces the existing entry at
    /// its original position, so going back and changing an answer can never
    /// double-count in scoring. No-op when the engine is uninitialized.
    pub fn submit_response(&mut self, value: ResponseValue) {
        let Some(question) = self.questions.get(self.current_question_index) else {
            return;
        };

        let response = Response {
            question_id: question.id.clone(),
            value,
            timestamp: Utc::now().timestamp_millis(),
        };

        match self
            .responses
            .iter_mut()
            .find(|r| r.question_id == response.question_id)
        {
            Some(existing) => *existing = response,
            None => self.responses.push(response),
        }
    }

    /// Advance the cursor to the next question. Returns `false` (without
    /// moving) when already at the last question. Never touches the stage
    /// counter; stage advancement is an explicit [`Self::complete_stage`].
    pub fn go_to_next_question(&mut self) -> bool {
        if self.current_question_index + 1 < self.questions.len() {
            self.current_question_index += 1;
            true
        } else {
            false
        }
    }

    /// Walk the cursor back one question, stopping at the first.
    pub fn go_to_prev_question(&mut self) {
        if self.current_question_index > 0 {
            self.current_question_index -= 1;
        }
    }

    /// The question under the cursor, or `None` when uninitialized.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    /// The response already recorded for the current question, if any. Lets
    /// a UI restore the previous answer when navigating backward.
    pub fn current_response_value(&self) -> Option<ResponseValue> {
        let question = self.current_question()?;
        self.responses
            .iter()
            .find(|r| r.question_id == question.id)
            .map(|r| r.value)
    }

    /// Progress counters for the current cursor position.
    pub fn stage_progress(&self) -> StageProgress {
        let per_stage = self.questions_per_stage as usize;
        let stage_start = (self.current_stage as usize - 1) * per_stage;

        // Clamp against transient out-of-range positions around stage
        // boundaries (stage already advanced, cursor not yet moved).
        let stage_question_index = self
            .current_question_index
            .saturating_sub(stage_start)
            .min(per_stage.saturating_sub(1));

        StageProgress {
            current: self.current_question_index + 1,
            total: per_stage * self.total_stages as usize,
            stage_question_index: stage_question_index + 1,
        }
    }

    /// True once the cursor has reached the last question of the current
    /// stage.
    pub fn is_stage_complete(&self) -> bool {
        let stage_end = self.current_stage as usize * self.questions_per_stage as usize - 1;
        self.current_question_index >= stage_end
    }

    /// Close out the current stage.
    ///
    /// Below the final stage this only increments the stage counter; the
    /// caller moves the cursor with [`Self::go_to_next_question`] after any
    /// interstitial. On the final stage this flips the session to completed
    /// and computes the scores — the single terminal transition. Calls after
    /// completion are no-ops.
    pub fn complete_stage(&mut self) {
        if self.is_completed {
            return;
        }
        if self.current_stage < self.total_stages {
            self.current_stage += 1;
        } else {
            self.is_completed = true;
            self.scores = Some(self.calculate_scores());
            tracing::info!(
                session_id = self.session_id.as_deref().unwrap_or("-"),
                "assessment completed"
            );
        }
    }

    /// Compute normalized career-field scores for the responses collected so
    /// far. Pure; [`Self::complete_stage`] stores the result on completion.
    pub fn calculate_scores(&self) -> CareerScores {
        calculate_scores(&self.questions, &self.responses)
    }

    /// Return the engine to its zero state, as if never initialized.
    pub fn reset_assessment(&mut self) {
        self.level = GradeLevel::ElementaryLower;
        self.questions = Vec::new();
        self.responses = Vec::new();
        self.current_question_index = 0;
        self.current_stage = 1;
        self.total_stages = 5;
        self.questions_per_stage = 7;
        self.session_id = None;
        self.started_at = None;
        self.is_completed = false;
        self.scores = None;
    }

    /// Checkpoint the in-flight session to the fixed storage key,
    /// overwriting any prior checkpoint. Saving before init is a silent
    /// no-op; storage failures propagate.
    pub async fn save_progress(&self) -> Result<(), EngineError> {
        let (Some(session_id), Some(started_at)) = (&self.session_id, self.started_at) else {
            tracing::debug!("save_progress before init, skipping");
            return Ok(());
        };

        let saved = SavedAssessmentState {
            level: self.level,
            responses: self.responses.clone(),
            current_question_index: self.current_question_index,
            current_stage: self.current_stage,
            session_id: session_id.clone(),
            started_at,
            saved_at: Utc::now().timestamp_millis(),
        };

        let json = serde_json::to_string(&saved)?;
        self.store.set(SAVED_ASSESSMENT_KEY, &json).await?;
        Ok(())
    }

    /// Best-effort checkpoint read. A missing, unreadable, or corrupt
    /// checkpoint is logged and reported as `None`, never an error, so a bad
    /// checkpoint can't block starting a new assessment.
    pub async fn load_saved_progress(&self) -> Option<SavedAssessmentState> {
        let stored = match self.store.get(SAVED_ASSESSMENT_KEY).await {
            Ok(stored) => stored?,
            Err(e) => {
                tracing::warn!("failed to read saved progress: {e}");
                return None;
            }
        };
        match serde_json::from_str::<SavedAssessmentState>(&stored) {
            Ok(saved) if saved.is_within_level_bounds() => Some(saved),
            Ok(_) => {
                tracing::warn!("saved progress is out of bounds for its level, ignoring checkpoint");
                None
            }
            Err(e) => {
                tracing::warn!("failed to parse saved progress, ignoring checkpoint: {e}");
                None
            }
        }
    }

    /// Replace the in-memory session wholesale from a checkpoint, re-fetching
    /// the question list and config for the saved level. A resumed session is
    /// never already-completed; completion re-derives from continued play.
    pub fn resume_assessment(&mut self, saved: SavedAssessmentState) {
        let config = GradeLevelConfig::for_level(saved.level);

        self.level = saved.level;
        self.questions = self.bank.questions_by_level(saved.level);
        self.responses = saved.responses;
        // Clamp the cursor even when handed a checkpoint that bypassed
        // `load_saved_progress`: `1 <= current_stage` and an in-range
        // question index are invariants of every live session.
        self.current_question_index = saved
            .current_question_index
            .min(self.questions.len().saturating_sub(1));
        self.current_stage = saved.current_stage.clamp(1, config.total_stages);
        self.total_stages = config.total_stages;
        self.questions_per_stage = config.questions_per_stage;
        self.session_id = Some(saved.session_id);
        self.started_at = Some(saved.started_at);
        self.is_completed = false;
        self.scores = None;
    }

    /// Remove the checkpoint. Storage failures are logged and swallowed.
    pub async fn clear_saved_progress(&self) {
        if let Err(e) = self.store.remove(SAVED_ASSESSMENT_KEY).await {
            tracing::warn!("failed to clear saved progress: {e}");
        }
    }

    /// Best-effort probe for an existing checkpoint.
    pub async fn has_saved_progress(&self) -> bool {
        matches!(self.store.get(SAVED_ASSESSMENT_KEY).await, Ok(Some(_)))
    }

    // --- Read accessors ---

    pub fn level(&self) -> GradeLevel {
        self.level
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn current_stage(&self) -> u32 {
        self.current_stage
    }

    pub fn total_stages(&self) -> u32 {
        self.total_stages
    }

    pub fn questions_per_stage(&self) -> u32 {
        self.questions_per_stage
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn started_at(&self) -> Option<i64> {
        self.started_at
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn scores(&self) -> Option<&CareerScores> {
        self.scores.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CareerField, CareerMapping, QuestionCategory};
    use crate::parser::QuestionCatalog;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Minimal in-memory store for engine tests.
    #[derive(Default)]
    struct TestStore {
        entries: Mutex<HashMap<String, String>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl StateStore for TestStore {
        async fn get(&self, key: &str) -> Result<Option<String>, crate::error::StorageError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), crate::error::StorageError> {
            if self.fail_writes {
                return Err(crate::error::StorageError::Backend("write refused".into()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), crate::error::StorageError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn question(id: &str, level: GradeLevel, stage: u32, primary: CareerField) -> Question {
        Question {
            id: id.into(),
            level,
            stage,
            category: QuestionCategory::Interest,
            content: format!("question {id}"),
            content_kid: None,
            career_mapping: CareerMapping {
                primary,
                secondary: None,
            },
        }
    }

    /// A full catalog for `level`, cycling primaries through all six fields.
    fn catalog_for(level: GradeLevel) -> Arc<QuestionCatalog> {
        let config = GradeLevelConfig::for_level(level);
        let questions = (0..config.total_questions)
            .map(|i| {
                let stage = i / config.questions_per_stage + 1;
                question(
                    &format!("{level}-{i}"),
                    level,
                    stage,
                    CareerField::ALL[i as usize % 6],
                )
            })
            .collect();
        Arc::new(QuestionCatalog::new("test-bank", "Test bank", questions))
    }

    fn engine_at(level: GradeLevel) -> SessionEngine {
        let mut engine = SessionEngine::new(catalog_for(level), Arc::new(TestStore::default()));
        engine.init_assessment(level);
        engine
    }

    fn v(value: u8) -> ResponseValue {
        ResponseValue::new(value).unwrap()
    }

    #[test]
    fn init_loads_level_config_and_questions() {
        let engine = engine_at(GradeLevel::Middle);
        assert_eq!(engine.questions().len(), 65);
        assert_eq!(engine.total_stages(), 5);
        assert_eq!(engine.questions_per_stage(), 13);
        assert_eq!(engine.current_stage(), 1);
        assert!(engine.session_id().is_some());
        assert!(engine.started_at().is_some());
        assert!(!engine.is_completed());
        assert!(engine.scores().is_none());
    }

    #[test]
    fn reinit_discards_previous_session() {
        let mut engine = engine_at(GradeLevel::Middle);
        engine.submit_response(v(5));
        engine.go_to_next_question();
        let first_id = engine.session_id().unwrap().to_string();

        engine.init_assessment(GradeLevel::Middle);
        assert!(engine.responses().is_empty());
        assert_eq!(engine.current_question_index(), 0);
        assert_ne!(engine.session_id().unwrap(), first_id);
    }

    #[test]
    fn submit_before_init_is_a_noop() {
        let mut engine =
            SessionEngine::new(catalog_for(GradeLevel::Middle), Arc::new(TestStore::default()));
        engine.submit_response(v(3));
        assert!(engine.responses().is_empty());
        assert!(engine.current_question().is_none());
    }

    #[test]
    fn resubmitting_upserts_in_place() {
        let mut engine = engine_at(GradeLevel::Middle);
        engine.submit_response(v(2));
        engine.go_to_next_question();
        engine.submit_response(v(4));

        // Walk back and change the first answer several times.
        engine.go_to_prev_question();
        engine.submit_response(v(1));
        engine.submit_response(v(5));

        let responses = engine.responses();
        assert_eq!(responses.len(), 2);
        // Replaced at its original position with the latest value.
        assert_eq!(responses[0].question_id, engine.questions()[0].id);
        assert_eq!(responses[0].value.get(), 5);
        assert_eq!(responses[1].value.get(), 4);
    }

    #[test]
    fn navigation_respects_bounds() {
        let mut engine = engine_at(GradeLevel::ElementaryLower);

        engine.go_to_prev_question();
        assert_eq!(engine.current_question_index(), 0);

        for _ in 0..34 {
            assert!(engine.go_to_next_question());
        }
        assert_eq!(engine.current_question_index(), 34);
        assert!(!engine.go_to_next_question());
        assert_eq!(engine.current_question_index(), 34);
    }

    #[test]
    fn current_response_value_tracks_cursor() {
        let mut engine = engine_at(GradeLevel::Middle);
        assert_eq!(engine.current_response_value(), None);
        engine.submit_response(v(4));
        assert_eq!(engine.current_response_value(), Some(v(4)));
        engine.go_to_next_question();
        assert_eq!(engine.current_response_value(), None);
        engine.go_to_prev_question();
        assert_eq!(engine.current_response_value(), Some(v(4)));
    }

    #[test]
    fn stage_progress_counts_and_clamps() {
        let mut engine = engine_at(GradeLevel::Middle);

        let progress = engine.stage_progress();
        assert_eq!(progress.current, 1);
        assert_eq!(progress.total, 65);
        assert_eq!(progress.stage_question_index, 1);

        // Move to the last question of stage 1.
        for _ in 0..12 {
            engine.go_to_next_question();
        }
        assert_eq!(engine.stage_progress().stage_question_index, 13);
        assert!(engine.is_stage_complete());

        // Stage advanced but cursor not yet moved: index clamps low.
        engine.complete_stage();
        assert_eq!(engine.current_stage(), 2);
        assert_eq!(engine.stage_progress().stage_question_index, 1);
        assert!(!engine.is_stage_complete());

        engine.go_to_next_question();
        assert_eq!(engine.stage_progress().stage_question_index, 1);
        assert_eq!(engine.stage_progress().current, 14);
    }

    #[test]
    fn completion_flips_exactly_once() {
        let mut engine = engine_at(GradeLevel::Middle);
        for stage in 1..=5u32 {
            assert!(!engine.is_completed(), "completed early at stage {stage}");
            engine.complete_stage();
        }
        assert!(engine.is_completed());
        assert!(engine.scores().is_some());

        // Further calls change nothing.
        let scores = *engine.scores().unwrap();
        engine.complete_stage();
        assert!(engine.is_completed());
        assert_eq!(*engine.scores().unwrap(), scores);
        assert_eq!(engine.current_stage(), 5);
    }

    #[test]
    fn full_run_with_all_fives_scores_every_mapped_field_at_100() {
        let mut engine = engine_at(GradeLevel::Middle);

        for stage in 1..=5 {
            for q in 0..13 {
                engine.submit_response(v(5));
                let last_of_stage = q == 12;
                if !last_of_stage {
                    assert!(engine.go_to_next_question());
                }
            }
            assert!(engine.is_stage_complete());
            engine.complete_stage();
            if stage < 5 {
                assert!(engine.go_to_next_question());
            }
        }

        assert!(engine.is_completed());
        assert_eq!(engine.responses().len(), 65);
        let scores = engine.scores().unwrap();
        for field in CareerField::ALL {
            assert_eq!(scores.get(field), 100, "field {field} should be 100");
        }
    }

    #[test]
    fn reset_returns_to_zero_state() {
        let mut engine = engine_at(GradeLevel::High);
        engine.submit_response(v(3));
        engine.reset_assessment();

        assert_eq!(engine.level(), GradeLevel::ElementaryLower);
        assert!(engine.questions().is_empty());
        assert!(engine.responses().is_empty());
        assert_eq!(engine.current_question_index(), 0);
        assert_eq!(engine.current_stage(), 1);
        assert!(engine.session_id().is_none());
        assert!(engine.started_at().is_none());
        assert!(!engine.is_completed());
        assert!(engine.scores().is_none());
    }

    #[tokio::test]
    async fn save_before_init_is_a_silent_noop() {
        let store = Arc::new(TestStore::default());
        let engine = SessionEngine::new(catalog_for(GradeLevel::Middle), store.clone());
        engine.save_progress().await.unwrap();
        assert!(!engine.has_saved_progress().await);
    }

    #[tokio::test]
    async fn save_and_resume_reproduce_the_session() {
        let store = Arc::new(TestStore::default());
        let bank = catalog_for(GradeLevel::Middle);
        let mut engine = SessionEngine::new(bank.clone(), store.clone());

        engine.init_assessment(GradeLevel::Middle);
        for value in [5, 3, 1, 4] {
            engine.submit_response(v(value));
            engine.go_to_next_question();
        }
        let session_id = engine.session_id().unwrap().to_string();
        let started_at = engine.started_at().unwrap();

        engine.save_progress().await.unwrap();
        assert!(engine.has_saved_progress().await);

        // A different engine instance picks the checkpoint up.
        let mut resumed = SessionEngine::new(bank, store);
        let saved = resumed.load_saved_progress().await.unwrap();
        resumed.resume_assessment(saved);

        assert_eq!(resumed.level(), GradeLevel::Middle);
        assert_eq!(resumed.responses().len(), 4);
        assert_eq!(resumed.responses()[0].value.get(), 5);
        assert_eq!(resumed.current_question_index(), 4);
        assert_eq!(resumed.current_stage(), 1);
        assert_eq!(resumed.session_id().unwrap(), session_id);
        assert_eq!(resumed.started_at().unwrap(), started_at);
        assert_eq!(resumed.questions().len(), 65);
        assert!(!resumed.is_completed());
        assert!(resumed.scores().is_none());
    }

    #[tokio::test]
    async fn resumed_session_is_never_completed() {
        let store = Arc::new(TestStore::default());
        let bank = catalog_for(GradeLevel::ElementaryLower);
        let mut engine = SessionEngine::new(bank.clone(), store.clone());

        engine.init_assessment(GradeLevel::ElementaryLower);
        for _ in 0..5 {
            engine.complete_stage();
        }
        assert!(engine.is_completed());
        engine.save_progress().await.unwrap();

        let saved = engine.load_saved_progress().await.unwrap();
        engine.resume_assessment(saved);
        assert!(!engine.is_completed());
        assert!(engine.scores().is_none());
    }

    #[tokio::test]
    async fn corrupt_checkpoint_reads_as_none() {
        let store = Arc::new(TestStore::default());
        store
            .set(SAVED_ASSESSMENT_KEY, "{not json")
            .await
            .unwrap();
        let engine = SessionEngine::new(catalog_for(GradeLevel::Middle), store);
        assert!(engine.load_saved_progress().await.is_none());
    }

    #[tokio::test]
    async fn out_of_range_checkpoint_reads_as_none() {
        let store = Arc::new(TestStore::default());
        let engine = SessionEngine::new(catalog_for(GradeLevel::Middle), store.clone());

        let mut tampered = SavedAssessmentState {
            level: GradeLevel::Middle,
            responses: vec![],
            current_question_index: 3,
            current_stage: 0,
            session_id: "session_tampered".into(),
            started_at: 1,
            saved_at: 2,
        };
        let json = serde_json::to_string(&tampered).unwrap();
        store.set(SAVED_ASSESSMENT_KEY, &json).await.unwrap();
        assert!(engine.load_saved_progress().await.is_none());

        tampered.current_stage = 9;
        let json = serde_json::to_string(&tampered).unwrap();
        store.set(SAVED_ASSESSMENT_KEY, &json).await.unwrap();
        assert!(engine.load_saved_progress().await.is_none());

        tampered.current_stage = 2;
        tampered.current_question_index = 65;
        let json = serde_json::to_string(&tampered).unwrap();
        store.set(SAVED_ASSESSMENT_KEY, &json).await.unwrap();
        assert!(engine.load_saved_progress().await.is_none());

        // The same cursor inside bounds loads fine.
        tampered.current_question_index = 20;
        let json = serde_json::to_string(&tampered).unwrap();
        store.set(SAVED_ASSESSMENT_KEY, &json).await.unwrap();
        assert!(engine.load_saved_progress().await.is_some());
    }

    #[test]
    fn resume_clamps_a_tampered_cursor() {
        let mut engine = engine_at(GradeLevel::Middle);
        engine.resume_assessment(SavedAssessmentState {
            level: GradeLevel::Middle,
            responses: vec![],
            current_question_index: 999,
            current_stage: 0,
            session_id: "session_tampered".into(),
            started_at: 1,
            saved_at: 2,
        });

        assert_eq!(engine.current_stage(), 1);
        assert_eq!(engine.current_question_index(), 64);
        // Derived reads stay panic-free on the clamped cursor.
        assert!(engine.is_stage_complete());
        let progress = engine.stage_progress();
        assert_eq!(progress.current, 65);
        assert_eq!(progress.stage_question_index, 13);
    }

    #[tokio::test]
    async fn second_save_overwrites_the_first() {
        let store = Arc::new(TestStore::default());
        let mut engine = SessionEngine::new(catalog_for(GradeLevel::Middle), store);
        engine.init_assessment(GradeLevel::Middle);

        engine.submit_response(v(2));
        engine.save_progress().await.unwrap();

        engine.go_to_next_question();
        engine.submit_response(v(5));
        engine.save_progress().await.unwrap();

        // Only the latest snapshot survives.
        let saved = engine.load_saved_progress().await.unwrap();
        assert_eq!(saved.current_question_index, 1);
        assert_eq!(saved.responses.len(), 2);
        assert_eq!(saved.responses[1].value.get(), 5);
    }

    #[tokio::test]
    async fn save_propagates_storage_failures() {
        let store = Arc::new(TestStore {
            entries: Mutex::new(HashMap::new()),
            fail_writes: true,
        });
        let mut engine = SessionEngine::new(catalog_for(GradeLevel::Middle), store);
        engine.init_assessment(GradeLevel::Middle);
        let err = engine.save_progress().await.unwrap_err();
        assert!(matches!(err, EngineError::Storage(_)));
    }

    #[tokio::test]
    async fn clear_removes_the_checkpoint() {
        let store = Arc::new(TestStore::default());
        let mut engine = SessionEngine::new(catalog_for(GradeLevel::Middle), store);
        engine.init_assessment(GradeLevel::Middle);
        engine.save_progress().await.unwrap();
        assert!(engine.has_saved_progress().await);

        engine.clear_saved_progress().await;
        assert!(!engine.has_saved_progress().await);
        assert!(engine.load_saved_progress().await.is_none());
    }
}
