//! Content quality gate.
//!
//! Generated content is regenerated when either independent gate fails:
//! - Fact gate: verifier score below `fact_score_min` (0.85)
//! - Drift gate: estimated emotion drift above `emotion_drift_max` (0.15)
//!
//! # Emotion drift
//!
//! ```text
//! delta  = +0.10 if correct else -0.15
//! delta -= 0.05  if slow_response_ms < response_time <= response_time_ceiling_ms
//! final  = clamp(initial + delta, 0, 1)
//! drift  = |initial - final|
//! ```
//!
//! Response times above the ceiling (24h) are data-entry errors and do not
//! add the slow-response penalty.

use super::verifier::{check_score, ContentVerifier, VERIFIER};
use crate::config::EngineConfig;
use crate::error::{EunoiaError, Result};
use crate::types::{ContentId, ContentQualityResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

const CORRECT_DELTA: f64 = 0.10;
const INCORRECT_DELTA: f64 = -0.15;
const SLOW_RESPONSE_PENALTY: f64 = 0.05;

// Tolerance for float noise when comparing drift against its threshold,
// so a plain -0.15 delta (0.15000000000000002) stays at the edge.
const DRIFT_EPSILON: f64 = 1e-12;

/// Pure drift/threshold policy shared by the gate and the response composer
#[derive(Debug, Clone)]
pub struct DriftPolicy {
    fact_score_min: f64,
    emotion_drift_max: f64,
    slow_response_ms: f64,
    response_time_ceiling_ms: f64,
}

impl Default for DriftPolicy {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl DriftPolicy {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            fact_score_min: config.fact_score_min,
            emotion_drift_max: config.emotion_drift_max,
            slow_response_ms: config.slow_response_ms as f64,
            response_time_ceiling_ms: config.response_time_ceiling_ms as f64,
        }
    }

    /// Estimated emotion drift caused by one answer
    pub fn emotion_drift(
        &self,
        initial_emotion_score: f64,
        is_correct: bool,
        response_time_ms: f64,
    ) -> Result<f64> {
        if !(0.0..=1.0).contains(&initial_emotion_score) {
            return Err(EunoiaError::InvalidInput(format!(
                "initial emotion score must be in [0, 1], got {}",
                initial_emotion_score
            )));
        }
        if !response_time_ms.is_finite() || response_time_ms < 0.0 {
            return Err(EunoiaError::InvalidInput(format!(
                "response time must be a non-negative number of milliseconds, got {}",
                response_time_ms
            )));
        }

        let initial = initial_emotion_score;
        let mut delta = if is_correct {
            CORRECT_DELTA
        } else {
            INCORRECT_DELTA
        };

        if response_time_ms > self.response_time_ceiling_ms {
            warn!(
                "response time {}ms exceeds sanity ceiling, ignoring slow-response penalty",
                response_time_ms
            );
        } else if response_time_ms > self.slow_response_ms {
            delta -= SLOW_RESPONSE_PENALTY;
        }

        let final_emotion = (initial + delta).clamp(0.0, 1.0);
        Ok((initial - final_emotion).abs())
    }

    /// True when the drift gate fails
    ///
    /// Drift within `DRIFT_EPSILON` of the threshold counts as at the
    /// threshold, which passes.
    pub fn drift_exceeded(&self, drift: f64) -> bool {
        drift - self.emotion_drift_max > DRIFT_EPSILON
    }

    /// True when either gate fails
    pub fn needs_regeneration(&self, fact_score: f64, drift: f64) -> bool {
        fact_score < self.fact_score_min || self.drift_exceeded(drift)
    }
}

/// Validates generated content before it is shown
pub struct QualityGate {
    verifier: Arc<dyn ContentVerifier>,
    policy: DriftPolicy,
    budget: Duration,
}

impl QualityGate {
    pub fn new(verifier: Arc<dyn ContentVerifier>, config: &EngineConfig) -> Self {
        Self {
            verifier,
            policy: DriftPolicy::new(config),
            budget: config.verifier_timeout,
        }
    }

    pub fn policy(&self) -> &DriftPolicy {
        &self.policy
    }

    /// Score a unit of content and decide whether it must be regenerated
    ///
    /// Invalid input fails before the verifier is called. Verifier failures
    /// and timeouts are returned as dependency errors; no score is invented.
    pub async fn evaluate(
        &self,
        content_id: &ContentId,
        initial_emotion_score: f64,
        is_correct: bool,
        response_time_ms: f64,
    ) -> Result<ContentQualityResult> {
        let emotion_drift = self
            .policy
            .emotion_drift(initial_emotion_score, is_correct, response_time_ms)?;

        let fact_score = match timeout(self.budget, self.verifier.verify(content_id)).await {
            Ok(Ok(score)) => check_score(content_id, score)?,
            Ok(Err(e)) => {
                warn!("Verification of {} failed: {}", content_id, e);
                return Err(e.into_dependency(VERIFIER));
            }
            Err(_) => {
                warn!("Verification of {} timed out after {:?}", content_id, self.budget);
                return Err(EunoiaError::DependencyTimeout {
                    dependency: VERIFIER,
                    budget: self.budget,
                });
            }
        };

        let needs_regeneration = self.policy.needs_regeneration(fact_score, emotion_drift);
        if needs_regeneration {
            info!(
                "Content {} needs regeneration (fact_score={:.3}, drift={:.3})",
                content_id, fact_score, emotion_drift
            );
        } else {
            debug!(
                "Content {} passed quality gate (fact_score={:.3}, drift={:.3})",
                content_id, fact_score, emotion_drift
            );
        }

        Ok(ContentQualityResult {
            fact_score,
            emotion_drift,
            needs_regeneration,
        })
    }
}
