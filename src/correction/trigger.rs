//! Correction threshold policy.
//!
//! Two cooperating entry points decide whether a routine needs regenerating:
//! - History path: tau_neg inside the inclusive correction band
//! - Vector path: tau_neg in band AND the fixed-width vector's negative
//!   ratio inside `[tau_neg, band_high]`

use crate::config::EngineConfig;
use crate::error::Result;
use crate::feedback::FeedbackAggregator;
use crate::types::{CorrectionDecision, FeedbackEvent};

/// Applies the correction band to feedback statistics
#[derive(Debug, Clone, Default)]
pub struct CorrectionTrigger {
    aggregator: FeedbackAggregator,
}

impl CorrectionTrigger {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            aggregator: FeedbackAggregator::new(config),
        }
    }

    pub fn from_aggregator(aggregator: FeedbackAggregator) -> Self {
        Self { aggregator }
    }

    pub fn aggregator(&self) -> &FeedbackAggregator {
        &self.aggregator
    }

    /// True iff `band_low <= tau_neg <= band_high`
    pub fn should_trigger_correction(&self, tau_neg: f64) -> bool {
        let (low, high) = self.aggregator.correction_band();
        (low..=high).contains(&tau_neg)
    }

    /// Vector-path trigger
    ///
    /// Fails with `FeatureVectorLength` when the vector is not exactly the
    /// configured width.
    pub fn should_trigger_feedback(&self, vector: &[f64], tau_neg: f64) -> Result<bool> {
        let ratio = self.aggregator.negative_ratio(vector)?;
        let (_, high) = self.aggregator.correction_band();
        Ok(self.should_trigger_correction(tau_neg) && (tau_neg..=high).contains(&ratio))
    }

    /// Build a decision for an already computed tau_neg
    pub fn decision(&self, tau_neg: f64) -> CorrectionDecision {
        let should_correct = self.should_trigger_correction(tau_neg);
        let magnitude = if should_correct {
            let (low, high) = self.aggregator.correction_band();
            (tau_neg - low) / (high - low)
        } else {
            0.0
        };

        CorrectionDecision {
            tau_neg,
            should_correct,
            magnitude,
        }
    }

    /// Decision over a chronological event history
    pub fn decide(&self, events: &[FeedbackEvent]) -> CorrectionDecision {
        self.decision(self.aggregator.tau_neg_for_events(events))
    }

    /// Decision over a chronological sequence of negative ratios
    pub fn decide_from_ratios(&self, ratios: &[f64]) -> Result<CorrectionDecision> {
        Ok(self.decision(self.aggregator.tau_neg(ratios)?))
    }
}
