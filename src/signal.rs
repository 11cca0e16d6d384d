//! Signal normalization
//!
//! Converts raw behavioral telemetry into bounded scores:
//! - Emotion score in [0, 1] (defaults to 0.5 when not reported)
//! - Stress score: 0.5 * error rate + 0.3 * fatigue + 0.2 * normalized latency
//! - Emotion band: High (>= 0.7), Medium (>= 0.4), Low otherwise
//!
//! Telemetry is untrusted, so finite out-of-range values are clamped into
//! range. Non-finite values are rejected.

use crate::config::EngineConfig;
use crate::error::{EunoiaError, Result};
use crate::types::{EmotionBand, EmotionSample, Telemetry};
use tracing::warn;

/// Lower bound (inclusive) of the High band
pub const HIGH_BAND_MIN: f64 = 0.7;

/// Lower bound (inclusive) of the Medium band
pub const MEDIUM_BAND_MIN: f64 = 0.4;

const ERROR_WEIGHT: f64 = 0.5;
const FATIGUE_WEIGHT: f64 = 0.3;
const LATENCY_WEIGHT: f64 = 0.2;

/// Bucket an emotion score into its band
pub fn band(emotion_score: f64) -> EmotionBand {
    if emotion_score >= HIGH_BAND_MIN {
        EmotionBand::High
    } else if emotion_score >= MEDIUM_BAND_MIN {
        EmotionBand::Medium
    } else {
        EmotionBand::Low
    }
}

/// Normalizes raw telemetry into an [`EmotionSample`]
#[derive(Debug, Clone)]
pub struct SignalNormalizer {
    default_emotion_score: f64,
    latency_saturation: f64,
}

impl Default for SignalNormalizer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl SignalNormalizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            default_emotion_score: config.default_emotion_score,
            latency_saturation: config.latency_saturation,
        }
    }

    /// Resolve a possibly missing emotion score
    pub fn emotion_score(&self, raw: Option<f64>) -> Result<f64> {
        match raw {
            Some(score) => clamp_unit("emotion_score", score),
            None => Ok(self.default_emotion_score),
        }
    }

    /// Composite stress score in [0, 1]
    ///
    /// Weights sum to 1 and each term is in [0, 1] after clamping, so the
    /// result needs no further clamping.
    pub fn stress_score(
        &self,
        emotion_score: f64,
        error_rate: f64,
        latency_count: f64,
    ) -> Result<f64> {
        let emotion_score = clamp_unit("emotion_score", emotion_score)?;
        let error_rate = clamp_unit("error_rate", error_rate)?;
        let latency_count = finite("latency_count", latency_count)?;
        if latency_count < 0.0 {
            warn!("latency_count {} is negative, clamping to 0", latency_count);
        }

        let fatigue = 1.0 - emotion_score;
        let normalized_latency = (latency_count.max(0.0) / self.latency_saturation).min(1.0);

        Ok(ERROR_WEIGHT * error_rate
            + FATIGUE_WEIGHT * fatigue
            + LATENCY_WEIGHT * normalized_latency)
    }

    /// Normalize a full telemetry reading
    pub fn normalize(&self, telemetry: &Telemetry) -> Result<EmotionSample> {
        let emotion_score = self.emotion_score(telemetry.emotion_score)?;
        let stress_score =
            self.stress_score(emotion_score, telemetry.error_rate, telemetry.latency_count)?;

        Ok(EmotionSample {
            emotion_score,
            stress_score,
            band: band(emotion_score),
        })
    }
}

fn finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EunoiaError::InvalidInput(format!(
            "{} must be a finite number, got {}",
            name, value
        )))
    }
}

fn clamp_unit(name: &str, value: f64) -> Result<f64> {
    let value = finite(name, value)?;
    if !(0.0..=1.0).contains(&value) {
        warn!("{} {} outside [0, 1], clamping", name, value);
    }
    Ok(value.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_band_boundaries_are_inclusive() {
        assert_eq!(band(0.7), EmotionBand::High);
        assert_eq!(band(0.6999), EmotionBand::Medium);
        assert_eq!(band(0.4), EmotionBand::Medium);
        assert_eq!(band(0.3999), EmotionBand::Low);
        assert_eq!(band(0.0), EmotionBand::Low);
        assert_eq!(band(1.0), EmotionBand::High);
    }

    #[test]
    fn test_stress_saturates_at_one() {
        let normalizer = SignalNormalizer::default();
        let stress = normalizer.stress_score(0.0, 1.0, 10.0).unwrap();
        assert!(approx(stress, 1.0));

        let stress = normalizer.stress_score(0.0, 1.0, 500.0).unwrap();
        assert!(approx(stress, 1.0));
    }

    #[test]
    fn test_stress_weighting() {
        let normalizer = SignalNormalizer::default();
        // 0.5 * 0.2 + 0.3 * 0.4 + 0.2 * 0.5
        let stress = normalizer.stress_score(0.6, 0.2, 5.0).unwrap();
        assert!(approx(stress, 0.32));
    }

    #[test]
    fn test_missing_emotion_defaults() {
        let normalizer = SignalNormalizer::default();
        let sample = normalizer.normalize(&Telemetry::default()).unwrap();
        assert_eq!(sample.emotion_score, 0.5);
        assert_eq!(sample.band, EmotionBand::Medium);
        assert!(approx(sample.stress_score, 0.15));
    }

    #[test]
    fn test_out_of_range_telemetry_is_clamped() {
        let normalizer = SignalNormalizer::default();
        let sample = normalizer
            .normalize(&Telemetry {
                emotion_score: Some(1.4),
                error_rate: -0.5,
                latency_count: -3.0,
                response_time_ms: None,
            })
            .unwrap();
        assert_eq!(sample.emotion_score, 1.0);
        assert_eq!(sample.band, EmotionBand::High);
        assert!(approx(sample.stress_score, 0.0));
    }

    #[test]
    fn test_non_finite_rejected() {
        let normalizer = SignalNormalizer::default();
        let err = normalizer.stress_score(f64::NAN, 0.1, 1.0).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(normalizer.emotion_score(Some(f64::INFINITY)).is_err());
    }

    proptest! {
        #[test]
        fn prop_band_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(band(lo) <= band(hi));
        }

        #[test]
        fn prop_stress_in_unit_range(
            emotion in 0.0f64..=1.0,
            error_rate in 0.0f64..=1.0,
            latency in 0.0f64..1000.0,
        ) {
            let stress = SignalNormalizer::default()
                .stress_score(emotion, error_rate, latency)
                .unwrap();
            prop_assert!((0.0..=1.0 + 1e-12).contains(&stress));
        }
    }
}
