//! Property tests for the scoring and threshold rules

use eunoia_core::{
    signal, CorrectionTrigger, DriftPolicy, EmotionBand, FeedbackAggregator, SignalNormalizer,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn band_is_one_of_three_and_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (band_lo, band_hi) = (signal::band(lo), signal::band(hi));
        prop_assert!(matches!(band_lo, EmotionBand::Low | EmotionBand::Medium | EmotionBand::High));
        prop_assert!(band_lo <= band_hi);
    }

    #[test]
    fn stress_stays_in_unit_interval(
        emotion in 0.0f64..=1.0,
        error_rate in 0.0f64..=1.0,
        latency in 0.0f64..=10_000.0,
    ) {
        let stress = SignalNormalizer::default()
            .stress_score(emotion, error_rate, latency)
            .unwrap();
        prop_assert!(stress >= 0.0);
        prop_assert!(stress <= 1.0 + 1e-12);
    }

    #[test]
    fn tau_neg_always_in_correction_band(
        ratios in proptest::collection::vec(0.0f64..=1.0, 1..100),
    ) {
        let aggregator = FeedbackAggregator::default();
        let tau = aggregator.tau_neg(&ratios).unwrap();
        prop_assert!((0.1..=0.3).contains(&tau));
        prop_assert!(CorrectionTrigger::default().should_trigger_correction(tau));
    }

    #[test]
    fn trigger_matches_closed_band(tau in -1.0f64..2.0) {
        let expected = (0.10..=0.30).contains(&tau);
        prop_assert_eq!(CorrectionTrigger::default().should_trigger_correction(tau), expected);
    }

    #[test]
    fn regeneration_is_either_gate(fact in 0.0f64..=1.0, drift in 0.0f64..=1.0) {
        let expected = fact < 0.85 || drift > 0.15;
        prop_assert_eq!(DriftPolicy::default().needs_regeneration(fact, drift), expected);
    }

    #[test]
    fn drift_never_exceeds_largest_delta(
        emotion in 0.0f64..=1.0,
        correct in any::<bool>(),
        response_time in 0.0f64..=200_000_000.0,
    ) {
        let drift = DriftPolicy::default()
            .emotion_drift(emotion, correct, response_time)
            .unwrap();
        prop_assert!(drift >= 0.0);
        prop_assert!(drift <= 0.2 + 1e-9);
    }
}

#[test]
fn trigger_boundaries() {
    let trigger = CorrectionTrigger::default();
    assert!(!trigger.should_trigger_correction(0.09999));
    assert!(!trigger.should_trigger_correction(0.30001));
    assert!(trigger.should_trigger_correction(0.10));
    assert!(trigger.should_trigger_correction(0.30));
}

#[test]
fn stress_boundary_is_exactly_one() {
    let stress = SignalNormalizer::default()
        .stress_score(0.0, 1.0, 10.0)
        .unwrap();
    assert!((stress - 1.0).abs() < 1e-12);
}
