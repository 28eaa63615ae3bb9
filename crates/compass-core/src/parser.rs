//! TOML question catalog parser.
//!
//! Loads question banks from TOML files and validates them against the
//! per-level configuration table.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::GradeLevelConfig;
use crate::model::{GradeLevel, Question};
use crate::traits::QuestionBank;

/// Intermediate TOML structure for catalog files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
}

/// A loaded question catalog. Implements [`QuestionBank`]; the per-level
/// question order is the file order.
#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    /// Unique identifier for this catalog.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    questions: Vec<Question>,
}

impl QuestionCatalog {
    /// Build a catalog from an already-materialized question list.
    pub fn new(id: impl Into<String>, name: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            questions,
        }
    }

    /// All questions across all levels, in file order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

impl QuestionBank for QuestionCatalog {
    fn questions_by_level(&self, level: GradeLevel) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.level == level)
            .cloned()
            .collect()
    }
}

/// Parse a single TOML file into a `QuestionCatalog`.
pub fn parse_question_bank(path: &Path) -> Result<QuestionCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank file: {}", path.display()))?;

    parse_question_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionCatalog` (useful for testing).
pub fn parse_question_bank_str(content: &str, source_path: &Path) -> Result<QuestionCatalog> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(QuestionCatalog {
        id: parsed.bank.id,
        name: parsed.bank.name,
        questions: parsed.questions,
    })
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a catalog for common issues.
pub fn validate_question_bank(catalog: &QuestionCatalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Check for duplicate question IDs
    let mut seen_ids = HashSet::new();
    for question in catalog.questions() {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    // Check for empty content and out-of-range stage indices
    for question in catalog.questions() {
        if question.content.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "content is empty".into(),
            });
        }
        let config = GradeLevelConfig::for_level(question.level);
        if question.stage == 0 || question.stage > config.total_stages {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!(
                    "stage {} is outside 1..={} for level {}",
                    question.stage, config.total_stages, question.level
                ),
            });
        }
    }

    // Check per-level question counts against the config table
    for level in [
        GradeLevel::ElementaryLower,
        GradeLevel::ElementaryUpper,
        GradeLevel::Middle,
        GradeLevel::High,
    ] {
        let count = catalog.questions_by_level(level).len() as u32;
        let expected = GradeLevelConfig::for_level(level).total_questions;
        if count > 0 && count != expected {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!(
                    "level {level} has {count} questions, config expects {expected}"
                ),
            });
        }
    }

    warnings
}
