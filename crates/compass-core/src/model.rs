//! Core data model types for the Career Compass assessment.
//!
//! These are the fundamental types the engine, scoring, and history layers
//! all operate on: career fields, Likert responses, catalog questions, and
//! the normalized per-field score map.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// The six career fields every assessment scores against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CareerField {
    Humanities,
    Social,
    Natural,
    Engineering,
    Medicine,
    Arts,
}

impl CareerField {
    /// All fields, in the canonical order used for tie-breaking.
    pub const ALL: [CareerField; 6] = [
        CareerField::Humanities,
        CareerField::Social,
        CareerField::Natural,
        CareerField::Engineering,
        CareerField::Medicine,
        CareerField::Arts,
    ];
}

impl fmt::Display for CareerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CareerField::Humanities => write!(f, "humanities"),
            CareerField::Social => write!(f, "social"),
            CareerField::Natural => write!(f, "natural"),
            CareerField::Engineering => write!(f, "engineering"),
            CareerField::Medicine => write!(f, "medicine"),
            CareerField::Arts => write!(f, "arts"),
        }
    }
}

impl FromStr for CareerField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "humanities" => Ok(CareerField::Humanities),
            "social" => Ok(CareerField::Social),
            "natural" => Ok(CareerField::Natural),
            "engineering" => Ok(CareerField::Engineering),
            "medicine" => Ok(CareerField::Medicine),
            "arts" => Ok(CareerField::Arts),
            other => Err(format!("unknown career field: {other}")),
        }
    }
}

/// A validated 5-point Likert response value (1..=5).
///
/// Construction goes through [`ResponseValue::new`] (or `TryFrom<u8>`), so
/// an out-of-range value is unrepresentable past the engine boundary — this
/// also applies to values deserialized from saved checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ResponseValue(u8);

impl ResponseValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Create a response value, rejecting anything outside `1..=5`.
    pub fn new(value: u8) -> Result<Self, EngineError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(ResponseValue(value))
        } else {
            Err(EngineError::InvalidResponseValue(value))
        }
    }

    /// The raw Likert value.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ResponseValue {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ResponseValue::new(value)
    }
}

impl From<ResponseValue> for u8 {
    fn from(value: ResponseValue) -> Self {
        value.0
    }
}

impl fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single recorded answer, keyed by question id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Id of the question this answers.
    pub question_id: String,
    /// The Likert value.
    pub value: ResponseValue,
    /// Unix millis when the answer was (last) submitted.
    pub timestamp: i64,
}

/// What a question probes. Catalog metadata; scoring does not branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Interest,
    Personality,
    Value,
    Validity,
}

/// How a question maps onto career fields: full weight to `primary`,
/// half weight to `secondary` when present.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CareerMapping {
    pub primary: CareerField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<CareerField>,
}

/// An immutable question catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique id across the catalog.
    pub id: String,
    /// Grade level this question belongs to.
    pub level: GradeLevel,
    /// 1-based stage the question is presented in.
    pub stage: u32,
    /// Question category.
    pub category: QuestionCategory,
    /// Display text.
    pub content: String,
    /// Simplified phrasing for younger students.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_kid: Option<String>,
    /// Career-field mapping used by scoring.
    pub career_mapping: CareerMapping,
}

/// The four grade-level tiers an assessment can run at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeLevel {
    ElementaryLower,
    ElementaryUpper,
    Middle,
    High,
}

impl GradeLevel {
    /// Human-readable label for history listings.
    pub fn label(&self) -> &'static str {
        match self {
            GradeLevel::ElementaryLower => "elementary (lower)",
            GradeLevel::ElementaryUpper => "elementary (upper)",
            GradeLevel::Middle => "middle school",
            GradeLevel::High => "high school",
        }
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeLevel::ElementaryLower => write!(f, "elementary_lower"),
            GradeLevel::ElementaryUpper => write!(f, "elementary_upper"),
            GradeLevel::Middle => write!(f, "middle"),
            GradeLevel::High => write!(f, "high"),
        }
    }
}

impl FromStr for GradeLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elementary_lower" => Ok(GradeLevel::ElementaryLower),
            "elementary_upper" => Ok(GradeLevel::ElementaryUpper),
            "middle" => Ok(GradeLevel::Middle),
            "high" => Ok(GradeLevel::High),
            other => Err(format!("unknown grade level: {other}")),
        }
    }
}

/// Normalized scores per career field, each in `0..=100`.
///
/// Always total: a field with no mapped responses is 0, never absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerScores {
    pub humanities: u8,
    pub social: u8,
    pub natural: u8,
    pub engineering: u8,
    pub medicine: u8,
    pub arts: u8,
}

impl CareerScores {
    /// Score for one field.
    pub fn get(&self, field: CareerField) -> u8 {
        match field {
            CareerField::Humanities => self.humanities,
            CareerField::Social => self.social,
            CareerField::Natural => self.natural,
            CareerField::Engineering => self.engineering,
            CareerField::Medicine => self.medicine,
            CareerField::Arts => self.arts,
        }
    }

    /// Set the score for one field.
    pub fn set(&mut self, field: CareerField, value: u8) {
        match field {
            CareerField::Humanities => self.humanities = value,
            CareerField::Social => self.social = value,
            CareerField::Natural => self.natural = value,
            CareerField::Engineering => self.engineering = value,
            CareerField::Medicine => self.medicine = value,
            CareerField::Arts => self.arts = value,
        }
    }

    /// The highest-scoring field and its score. Ties resolve to the first
    /// field in [`CareerField::ALL`] order.
    pub fn top(&self) -> (CareerField, u8) {
        let mut best = (CareerField::ALL[0], self.get(CareerField::ALL[0]));
        for &field in &CareerField::ALL[1..] {
            let score = self.get(field);
            if score > best.1 {
                best = (field, score);
            }
        }
        best
    }
}
