//! Core data types for the correction engine
//!
//! Everything here is a value object except the feedback history, which is
//! owned by a [`FeedbackStore`](crate::feedback::FeedbackStore) per subject.

use crate::error::{EunoiaError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a feedback subject (a study routine)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a unit of generated content (explanation or question)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single piece of community feedback about a subject
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub subject_id: SubjectId,
    /// Sentiment in [-1, 1]
    pub sentiment: f64,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl FeedbackEvent {
    /// Create an event stamped with the current time
    pub fn new(subject_id: SubjectId, sentiment: f64) -> Result<Self> {
        Self::at(subject_id, sentiment, Utc::now())
    }

    /// Create an event with an explicit timestamp
    pub fn at(subject_id: SubjectId, sentiment: f64, timestamp: DateTime<Utc>) -> Result<Self> {
        let event = Self {
            id: Uuid::new_v4(),
            subject_id,
            sentiment,
            timestamp,
        };
        event.validate()?;
        Ok(event)
    }

    /// Check the sentiment range (used for deserialized events too)
    pub fn validate(&self) -> Result<()> {
        if !self.sentiment.is_finite() || !(-1.0..=1.0).contains(&self.sentiment) {
            return Err(EunoiaError::InvalidInput(format!(
                "sentiment for {} must be in [-1, 1], got {}",
                self.subject_id, self.sentiment
            )));
        }
        Ok(())
    }

    /// Negative-ratio contribution of this event: 1.0 if negative, else 0.0
    pub fn neg_ratio(&self, cutoff: f64) -> f64 {
        if self.sentiment < cutoff {
            1.0
        } else {
            0.0
        }
    }
}

/// Coarse emotion tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionBand {
    Low,
    Medium,
    High,
}

impl fmt::Display for EmotionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmotionBand::Low => write!(f, "low"),
            EmotionBand::Medium => write!(f, "medium"),
            EmotionBand::High => write!(f, "high"),
        }
    }
}

/// Normalized emotion reading for one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionSample {
    pub emotion_score: f64,
    pub stress_score: f64,
    pub band: EmotionBand,
}

/// Raw, untrusted telemetry supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Self-reported or inferred emotion score; defaults when absent
    #[serde(default)]
    pub emotion_score: Option<f64>,
    #[serde(default)]
    pub error_rate: f64,
    /// Number of slow responses
    #[serde(default)]
    pub latency_count: f64,
    #[serde(default)]
    pub response_time_ms: Option<f64>,
}

/// Outcome of evaluating a subject's feedback history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionDecision {
    pub tau_neg: f64,
    pub should_correct: bool,
    /// Position of tau_neg inside the correction band (0 when not correcting)
    pub magnitude: f64,
}

/// Verdict of the content quality gate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentQualityResult {
    pub fact_score: f64,
    pub emotion_drift: f64,
    pub needs_regeneration: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_event_rejects_out_of_range() {
        assert!(FeedbackEvent::new("routine-1".into(), 1.5).is_err());
        assert!(FeedbackEvent::new("routine-1".into(), f64::NAN).is_err());
        assert!(FeedbackEvent::new("routine-1".into(), -1.0).is_ok());
    }

    #[test]
    fn test_neg_ratio_uses_strict_cutoff() {
        let at_cutoff = FeedbackEvent::new("r".into(), -0.1).unwrap();
        let below = FeedbackEvent::new("r".into(), -0.11).unwrap();
        assert_eq!(at_cutoff.neg_ratio(-0.1), 0.0);
        assert_eq!(below.neg_ratio(-0.1), 1.0);
    }

    #[test]
    fn test_band_ordering() {
        assert!(EmotionBand::Low < EmotionBand::Medium);
        assert!(EmotionBand::Medium < EmotionBand::High);
        assert_eq!(EmotionBand::High.to_string(), "high");
    }

    #[test]
    fn test_event_deserializes_with_defaults() {
        let event: FeedbackEvent =
            serde_json::from_str(r#"{"subject_id": "routine-7", "sentiment": -0.4}"#).unwrap();
        assert_eq!(event.subject_id.as_str(), "routine-7");
        assert_eq!(event.sentiment, -0.4);
    }
}
