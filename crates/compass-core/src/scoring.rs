//! Weighted career-field scoring.
//!
//! Each response contributes its raw Likert value to its question's primary
//! field at weight 1.0 and to the secondary field (if any) at weight 0.5.
//! Per-field means are then rescaled linearly from the 1..=5 response range
//! onto 0..=100. Aggregation is commutative, so response order never
//! affects the result.

use std::collections::HashMap;

use crate::model::{CareerField, CareerScores, Question, Response};

/// Compute normalized scores for a set of responses against the question
/// list they answer.
///
/// Fields with no mapped responses stay 0. Responses whose question id is
/// not in `questions` are skipped.
pub fn calculate_scores(questions: &[Question], responses: &[Response]) -> CareerScores {
    let by_id: HashMap<&str, &Question> =
        questions.iter().map(|q| (q.id.as_str(), q)).collect();

    let mut sums = [0.0f64; CareerField::ALL.len()];
    let mut counts = [0.0f64; CareerField::ALL.len()];

    for response in responses {
        let Some(question) = by_id.get(response.question_id.as_str()) else {
            continue;
        };
        let value = f64::from(response.value.get());
        let mapping = question.career_mapping;

        let primary = field_index(mapping.primary);
        sums[primary] += value;
        counts[primary] += 1.0;

        if let Some(secondary) = mapping.secondary {
            let secondary = field_index(secondary);
            sums[secondary] += value * 0.5;
            counts[secondary] += 0.5;
        }
    }

    let mut scores = CareerScores::default();
    for (i, field) in CareerField::ALL.into_iter().enumerate() {
        if counts[i] > 0.0 {
            let avg = sums[i] / counts[i];
            let normalized = ((avg - 1.0) / 4.0 * 100.0).round();
            scores.set(field, normalized as u8);
        }
    }
    scores
}

fn field_index(field: CareerField) -> usize {
    CareerField::ALL
        .iter()
        .position(|f| *f == field)
        .expect("ALL covers every CareerField")
}
