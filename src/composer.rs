//! Personalized response composition.
//!
//! Maps an answer outcome to feedback categories. Wording is left to the
//! presentation layer; only the taxonomy and selection rule live here.
//!
//! | band   | correct              | incorrect            |
//! |--------|----------------------|----------------------|
//! | High   | `MasteryAffirmation` | `ConfidentCorrection`|
//! | Medium | `SteadyEncouragement`| `GuidedReview`       |
//! | Low    | `ConfidenceBoost`    | `GentleSupport`      |
//!
//! Drift above the threshold appends [`Recommendation::TakeRest`] to
//! whatever the base message recommends.

use crate::config::EngineConfig;
use crate::error::{EunoiaError, Result};
use crate::quality::DriftPolicy;
use crate::types::EmotionBand;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the answer went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceCategory {
    Correct,
    CorrectSlow,
    Incorrect,
    IncorrectSlow,
}

/// Learner's current emotional state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionCategory {
    Energized,
    Steady,
    Strained,
}

impl From<EmotionBand> for EmotionCategory {
    fn from(band: EmotionBand) -> Self {
        match band {
            EmotionBand::High => EmotionCategory::Energized,
            EmotionBand::Medium => EmotionCategory::Steady,
            EmotionBand::Low => EmotionCategory::Strained,
        }
    }
}

/// Base feedback message, one per (band, correctness) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    MasteryAffirmation,
    ConfidentCorrection,
    SteadyEncouragement,
    GuidedReview,
    ConfidenceBoost,
    GentleSupport,
}

impl MessageCategory {
    pub fn select(band: EmotionBand, is_correct: bool) -> Self {
        match (band, is_correct) {
            (EmotionBand::High, true) => MessageCategory::MasteryAffirmation,
            (EmotionBand::High, false) => MessageCategory::ConfidentCorrection,
            (EmotionBand::Medium, true) => MessageCategory::SteadyEncouragement,
            (EmotionBand::Medium, false) => MessageCategory::GuidedReview,
            (EmotionBand::Low, true) => MessageCategory::ConfidenceBoost,
            (EmotionBand::Low, false) => MessageCategory::GentleSupport,
        }
    }

    /// Recommendation implied by the base message
    pub fn recommendation(&self) -> Recommendation {
        match self {
            MessageCategory::MasteryAffirmation => Recommendation::IncreaseDifficulty,
            MessageCategory::SteadyEncouragement => Recommendation::ContinuePractice,
            MessageCategory::ConfidenceBoost => Recommendation::ContinuePractice,
            MessageCategory::ConfidentCorrection => Recommendation::ReviewExplanation,
            MessageCategory::GuidedReview => Recommendation::ReviewExplanation,
            MessageCategory::GentleSupport => Recommendation::EasierQuestions,
        }
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageCategory::MasteryAffirmation => write!(f, "mastery_affirmation"),
            MessageCategory::ConfidentCorrection => write!(f, "confident_correction"),
            MessageCategory::SteadyEncouragement => write!(f, "steady_encouragement"),
            MessageCategory::GuidedReview => write!(f, "guided_review"),
            MessageCategory::ConfidenceBoost => write!(f, "confidence_boost"),
            MessageCategory::GentleSupport => write!(f, "gentle_support"),
        }
    }
}

/// Next-step recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    IncreaseDifficulty,
    ContinuePractice,
    ReviewExplanation,
    EasierQuestions,
    TakeRest,
}

/// Categories selected for one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedResponse {
    pub performance: PerformanceCategory,
    pub emotion: EmotionCategory,
    pub message: MessageCategory,
    /// Base recommendation first, `TakeRest` appended on excessive drift
    pub recommendations: Vec<Recommendation>,
}

impl ComposedResponse {
    pub fn rest_recommended(&self) -> bool {
        self.recommendations.contains(&Recommendation::TakeRest)
    }
}

/// Selects feedback categories for an answer
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    policy: DriftPolicy,
    slow_response_ms: f64,
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ResponseComposer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            policy: DriftPolicy::new(config),
            slow_response_ms: config.slow_response_ms as f64,
        }
    }

    pub fn compose(
        &self,
        is_correct: bool,
        band: EmotionBand,
        response_time_ms: f64,
        drift: f64,
    ) -> Result<ComposedResponse> {
        if !response_time_ms.is_finite() || response_time_ms < 0.0 {
            return Err(EunoiaError::InvalidInput(format!(
                "response time must be a non-negative number of milliseconds, got {}",
                response_time_ms
            )));
        }
        if !drift.is_finite() || drift < 0.0 {
            return Err(EunoiaError::InvalidInput(format!(
                "drift must be a non-negative number, got {}",
                drift
            )));
        }

        let slow = response_time_ms > self.slow_response_ms;
        let performance = match (is_correct, slow) {
            (true, false) => PerformanceCategory::Correct,
            (true, true) => PerformanceCategory::CorrectSlow,
            (false, false) => PerformanceCategory::Incorrect,
            (false, true) => PerformanceCategory::IncorrectSlow,
        };

        let message = MessageCategory::select(band, is_correct);
        let mut recommendations = vec![message.recommendation()];
        if self.policy.drift_exceeded(drift) {
            recommendations.push(Recommendation::TakeRest);
        }

        Ok(ComposedResponse {
            performance,
            emotion: band.into(),
            message,
            recommendations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_distinct_base_messages() {
        let mut seen = std::collections::HashSet::new();
        for band in [EmotionBand::High, EmotionBand::Medium, EmotionBand::Low] {
            for correct in [true, false] {
                seen.insert(MessageCategory::select(band, correct));
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_compose_without_drift() {
        let composer = ResponseComposer::default();
        let response = composer.compose(true, EmotionBand::High, 10_000.0, 0.1).unwrap();

        assert_eq!(response.performance, PerformanceCategory::Correct);
        assert_eq!(response.emotion, EmotionCategory::Energized);
        assert_eq!(response.message, MessageCategory::MasteryAffirmation);
        assert_eq!(response.recommendations, vec![Recommendation::IncreaseDifficulty]);
        assert!(!response.rest_recommended());
    }

    #[test]
    fn test_drift_appends_rest() {
        let composer = ResponseComposer::default();
        let response = composer.compose(false, EmotionBand::Low, 150_000.0, 0.2).unwrap();

        assert_eq!(response.performance, PerformanceCategory::IncorrectSlow);
        assert_eq!(response.message, MessageCategory::GentleSupport);
        assert_eq!(
            response.recommendations,
            vec![Recommendation::EasierQuestions, Recommendation::TakeRest]
        );
    }

    #[test]
    fn test_drift_at_threshold_does_not_append_rest() {
        let composer = ResponseComposer::default();
        let response = composer.compose(false, EmotionBand::Medium, 1_000.0, 0.15).unwrap();
        assert!(!response.rest_recommended());
        assert_eq!(response.message, MessageCategory::GuidedReview);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let composer = ResponseComposer::default();
        assert!(composer.compose(true, EmotionBand::High, -1.0, 0.0).is_err());
        assert!(composer.compose(true, EmotionBand::High, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&MessageCategory::ConfidentCorrection).unwrap();
        assert_eq!(json, "\"confident_correction\"");
        assert_eq!(
            MessageCategory::ConfidentCorrection.to_string(),
            "confident_correction"
        );
    }
}
