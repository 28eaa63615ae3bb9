//! Static per-grade-level assessment configuration.
//!
//! One entry per [`GradeLevel`]: how many questions, how they split into
//! stages, and the advisory session timeout. The timeout and category
//! weights are carried as data only; no engine operation enforces them.

use std::time::Duration;

use crate::model::GradeLevel;

/// Relative emphasis of question categories for a level. Advisory data for
/// catalog authors; the scoring kernel weighs every response the same.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryWeights {
    pub interest: f64,
    pub personality: f64,
    pub value: f64,
}

/// Configuration for one grade-level tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeLevelConfig {
    pub level: GradeLevel,
    /// Total questions across all stages (`questions_per_stage * total_stages`).
    pub total_questions: u32,
    pub questions_per_stage: u32,
    pub total_stages: u32,
    /// Advisory session timeout. Not enforced by any engine operation.
    pub session_timeout: Duration,
    pub weights: CategoryWeights,
}

static CONFIGS: [GradeLevelConfig; 4] = [
    GradeLevelConfig {
        level: GradeLevel::ElementaryLower,
        total_questions: 35,
        questions_per_stage: 7,
        total_stages: 5,
        session_timeout: Duration::from_secs(15 * 60),
        weights: CategoryWeights {
            interest: 0.60,
            personality: 0.25,
            value: 0.15,
        },
    },
    GradeLevelConfig {
        level: GradeLevel::ElementaryUpper,
        total_questions: 45,
        questions_per_stage: 9,
        total_stages: 5,
        session_timeout: Duration::from_secs(18 * 60),
        weights: CategoryWeights {
            interest: 0.55,
            personality: 0.25,
            value: 0.20,
        },
    },
    GradeLevelConfig {
        level: GradeLevel::Middle,
        total_questions: 65,
        questions_per_stage: 13,
        total_stages: 5,
        session_timeout: Duration::from_secs(25 * 60),
        weights: CategoryWeights {
            interest: 0.40,
            personality: 0.35,
            value: 0.25,
        },
    },
    GradeLevelConfig {
        level: GradeLevel::High,
        total_questions: 85,
        questions_per_stage: 17,
        total_stages: 5,
        session_timeout: Duration::from_secs(30 * 60),
        weights: CategoryWeights {
            interest: 0.30,
            personality: 0.35,
            value: 0.35,
        },
    },
];

impl GradeLevelConfig {
    /// Look up the static configuration for a level.
    pub fn for_level(level: GradeLevel) -> &'static GradeLevelConfig {
        CONFIGS
            .iter()
            .find(|c| c.level == level)
            .expect("config table covers every GradeLevel")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_has_a_config() {
        for level in [
            GradeLevel::ElementaryLower,
            GradeLevel::ElementaryUpper,
            GradeLevel::Middle,
            GradeLevel::High,
        ] {
            let config = GradeLevelConfig::for_level(level);
            assert_eq!(config.level, level);
            assert_eq!(
                config.total_questions,
                config.questions_per_stage * config.total_stages
            );
        }
    }

    #[test]
    fn middle_tier_matches_catalog() {
        let config = GradeLevelConfig::for_level(GradeLevel::Middle);
        assert_eq!(config.total_questions, 65);
        assert_eq!(config.questions_per_stage, 13);
        assert_eq!(config.total_stages, 5);
        assert_eq!(config.session_timeout, Duration::from_secs(1500));
    }
}
