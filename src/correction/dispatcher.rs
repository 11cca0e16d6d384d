//! Correction dispatch.
//!
//! Reads a subject's feedback window, computes the [`CorrectionDecision`],
//! and hands it to the [`RoutineRegenerator`] when correction is warranted.
//! The regenerator runs under a time budget; failures and timeouts surface
//! as dependency errors and are never retried here.

use super::trigger::CorrectionTrigger;
use crate::error::{EunoiaError, Result};
use crate::feedback::FeedbackStore;
use crate::types::{CorrectionDecision, SubjectId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

#[cfg(test)]
use mockall::automock;

const REGENERATOR: &str = "routine regenerator";
const STORE: &str = "feedback store";

/// Capability that rebuilds a study routine from a correction decision
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoutineRegenerator: Send + Sync {
    async fn regenerate(&self, subject_id: &SubjectId, decision: &CorrectionDecision) -> Result<()>;
}

/// Result of a dispatch attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub subject_id: SubjectId,
    pub decision: CorrectionDecision,
    /// True when the regenerator was invoked and succeeded
    pub dispatched: bool,
}

/// Evaluates subjects and forwards triggered decisions to the regenerator
pub struct CorrectionDispatcher {
    store: Arc<dyn FeedbackStore>,
    regenerator: Arc<dyn RoutineRegenerator>,
    trigger: CorrectionTrigger,
    budget: Duration,
}

impl CorrectionDispatcher {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        regenerator: Arc<dyn RoutineRegenerator>,
        trigger: CorrectionTrigger,
        budget: Duration,
    ) -> Self {
        Self {
            store,
            regenerator,
            trigger,
            budget,
        }
    }

    pub fn trigger(&self) -> &CorrectionTrigger {
        &self.trigger
    }

    /// Compute the decision for a subject without dispatching it
    pub async fn evaluate(&self, subject_id: &SubjectId) -> Result<CorrectionDecision> {
        let window_size = self.trigger.aggregator().window_size();
        let window = self
            .store
            .recent_window(subject_id, window_size)
            .await
            .map_err(|e| e.into_dependency(STORE))?;

        let decision = self.trigger.decide(&window);
        debug!(
            "Subject {}: tau_neg={:.4} should_correct={} over {} events",
            subject_id,
            decision.tau_neg,
            decision.should_correct,
            window.len()
        );
        Ok(decision)
    }

    /// Evaluate a subject and invoke the regenerator if correction fires
    pub async fn dispatch(&self, subject_id: &SubjectId) -> Result<DispatchOutcome> {
        let decision = self.evaluate(subject_id).await?;

        if !decision.should_correct {
            return Ok(DispatchOutcome {
                subject_id: subject_id.clone(),
                decision,
                dispatched: false,
            });
        }

        info!(
            "Dispatching correction for {} (tau_neg={:.4}, magnitude={:.2})",
            subject_id, decision.tau_neg, decision.magnitude
        );

        match timeout(self.budget, self.regenerator.regenerate(subject_id, &decision)).await {
            Ok(Ok(())) => Ok(DispatchOutcome {
                subject_id: subject_id.clone(),
                decision,
                dispatched: true,
            }),
            Ok(Err(e)) => {
                warn!("Routine regeneration for {} failed: {}", subject_id, e);
                Err(e.into_dependency(REGENERATOR))
            }
            Err(_) => {
                warn!(
                    "Routine regeneration for {} timed out after {:?}",
                    subject_id, self.budget
                );
                Err(EunoiaError::DependencyTimeout {
                    dependency: REGENERATOR,
                    budget: self.budget,
                })
            }
        }
    }
}

/// Regenerator that records every decision it receives
///
/// Deterministic stand-in for tests and offline replays.
#[derive(Debug, Default)]
pub struct RecordingRegenerator {
    calls: Mutex<Vec<(SubjectId, CorrectionDecision)>>,
    fail_with: Option<String>,
}

impl RecordingRegenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A regenerator that records the call and then fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    pub fn calls(&self) -> Vec<(SubjectId, CorrectionDecision)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RoutineRegenerator for RecordingRegenerator {
    async fn regenerate(
        &self,
        subject_id: &SubjectId,
        decision: &CorrectionDecision,
    ) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((subject_id.clone(), *decision));
        }
        match &self.fail_with {
            Some(message) => Err(EunoiaError::dependency(REGENERATOR, message.clone())),
            None => Ok(()),
        }
    }
}
