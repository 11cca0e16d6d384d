//! Negative-feedback statistics.
//!
//! Two independent measures are exposed from the same component so the
//! shared constants stay in one place:
//!
//! - **tau_neg**: exponentially smoothed negative ratio over the most recent
//!   window of a subject's history, saturated into the correction band.
//! - **negative_ratio**: fraction of negative entries in a fixed-width
//!   feedback vector.
//!
//! # Smoothing
//!
//! ```text
//! seed     = first windowed ratio (default_seed when empty)
//! smoothed = lambda * current + (1 - lambda) * smoothed
//! tau_neg  = clamp(smoothed, band_low, band_high)
//! ```

use crate::config::EngineConfig;
use crate::error::{EunoiaError, Result};
use crate::types::FeedbackEvent;
use tracing::debug;

/// Computes negative-feedback statistics for one subject at a time
#[derive(Debug, Clone)]
pub struct FeedbackAggregator {
    lambda: f64,
    window_size: usize,
    default_seed: f64,
    band_low: f64,
    band_high: f64,
    vector_len: usize,
    negative_cutoff: f64,
}

impl Default for FeedbackAggregator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl FeedbackAggregator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            lambda: config.smoothing_lambda,
            window_size: config.window_size,
            default_seed: config.default_seed,
            band_low: config.correction_band_low,
            band_high: config.correction_band_high,
            vector_len: config.feature_vector_len,
            negative_cutoff: config.negative_sentiment_cutoff,
        }
    }

    /// Override the smoothing factor
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Inclusive correction band `(low, high)`
    pub fn correction_band(&self) -> (f64, f64) {
        (self.band_low, self.band_high)
    }

    pub fn negative_cutoff(&self) -> f64 {
        self.negative_cutoff
    }

    /// Smoothed negative ratio without the band clamp
    ///
    /// `ratios` must be in chronological order; only the last `window_size`
    /// entries are used.
    pub fn smoothed_neg_ratio(&self, ratios: &[f64]) -> Result<f64> {
        if let Some(bad) = ratios
            .iter()
            .find(|r| !r.is_finite() || !(0.0..=1.0).contains(*r))
        {
            return Err(EunoiaError::InvalidInput(format!(
                "negative ratio must be in [0, 1], got {}",
                bad
            )));
        }
        Ok(self.smooth(ratios.iter().copied()))
    }

    /// tau_neg over a chronological sequence of per-entry negative ratios
    pub fn tau_neg(&self, ratios: &[f64]) -> Result<f64> {
        let smoothed = self.smoothed_neg_ratio(ratios)?;
        Ok(self.saturate(smoothed))
    }

    /// Smoothed negative ratio of an event history, without the band clamp
    pub fn smoothed_neg_ratio_for_events(&self, events: &[FeedbackEvent]) -> f64 {
        self.smooth(events.iter().map(|e| e.neg_ratio(self.negative_cutoff)))
    }

    /// tau_neg of a chronological event history
    pub fn tau_neg_for_events(&self, events: &[FeedbackEvent]) -> f64 {
        let smoothed = self.smoothed_neg_ratio_for_events(events);
        let tau = self.saturate(smoothed);
        debug!(
            "tau_neg over {} events: smoothed={:.4}, saturated={:.4}",
            events.len().min(self.window_size),
            smoothed,
            tau
        );
        tau
    }

    /// Fraction of entries below the negative cutoff in a fixed-width vector
    ///
    /// The vector must have exactly `feature_vector_len` samples.
    pub fn negative_ratio(&self, vector: &[f64]) -> Result<f64> {
        if vector.len() != self.vector_len {
            return Err(EunoiaError::FeatureVectorLength {
                expected: self.vector_len,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(EunoiaError::InvalidInput(
                "feature vector contains a non-finite sample".to_string(),
            ));
        }

        let negatives = vector.iter().filter(|&&v| v < self.negative_cutoff).count();
        Ok(negatives as f64 / self.vector_len as f64)
    }

    fn smooth<I>(&self, ratios: I) -> f64
    where
        I: ExactSizeIterator<Item = f64>,
    {
        let skip = ratios.len().saturating_sub(self.window_size);
        let mut window = ratios.skip(skip);

        let Some(seed) = window.next() else {
            return self.default_seed;
        };

        window.fold(seed, |smoothed, current| {
            self.lambda * current + (1.0 - self.lambda) * smoothed
        })
    }

    fn saturate(&self, smoothed: f64) -> f64 {
        smoothed.clamp(self.band_low, self.band_high)
    }
}
