//! Content verifier capability and stock implementations.
//!
//! A verifier returns a factual-accuracy score in [0, 1] for a unit of
//! generated content. Scores outside that range are treated as a verifier
//! failure rather than clamped.

use crate::error::{EunoiaError, Result};
use crate::types::ContentId;
use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

pub(crate) const VERIFIER: &str = "content verifier";

/// Capability that scores generated content for factual accuracy
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContentVerifier: Send + Sync {
    async fn verify(&self, content_id: &ContentId) -> Result<f64>;
}

/// Reject scores a verifier should never produce
pub(crate) fn check_score(content_id: &ContentId, score: f64) -> Result<f64> {
    if score.is_finite() && (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(EunoiaError::dependency(
            VERIFIER,
            format!("score {} for {} is outside [0, 1]", score, content_id),
        ))
    }
}

/// Averages two or more independent verifiers
///
/// Any member failing fails the whole ensemble.
pub struct EnsembleVerifier {
    members: Vec<Arc<dyn ContentVerifier>>,
}

impl EnsembleVerifier {
    pub fn new(members: Vec<Arc<dyn ContentVerifier>>) -> Result<Self> {
        if members.len() < 2 {
            return Err(EunoiaError::InvalidInput(format!(
                "an ensemble needs at least 2 verifiers, got {}",
                members.len()
            )));
        }
        Ok(Self { members })
    }
}

#[async_trait]
impl ContentVerifier for EnsembleVerifier {
    async fn verify(&self, content_id: &ContentId) -> Result<f64> {
        let scores =
            try_join_all(self.members.iter().map(|member| member.verify(content_id))).await?;

        let mut total = 0.0;
        for score in scores {
            total += check_score(content_id, score)?;
        }

        let score = total / self.members.len() as f64;
        debug!(
            "Ensemble of {} verifiers scored {} at {:.3}",
            self.members.len(),
            content_id,
            score
        );
        Ok(score)
    }
}

/// Verifier backed by a fixed score table
///
/// Deterministic stand-in for tests and offline evaluation.
#[derive(Debug, Clone, Default)]
pub struct FixedVerifier {
    scores: HashMap<ContentId, f64>,
    fallback: Option<f64>,
}

impl FixedVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score every content unit the same
    pub fn always(score: f64) -> Self {
        Self {
            scores: HashMap::new(),
            fallback: Some(score),
        }
    }

    pub fn with_score(mut self, content_id: impl Into<ContentId>, score: f64) -> Self {
        self.scores.insert(content_id.into(), score);
        self
    }
}

#[async_trait]
impl ContentVerifier for FixedVerifier {
    async fn verify(&self, content_id: &ContentId) -> Result<f64> {
        self.scores
            .get(content_id)
            .copied()
            .or(self.fallback)
            .ok_or_else(|| {
                EunoiaError::dependency(VERIFIER, format!("no score for {}", content_id))
            })
    }
}
