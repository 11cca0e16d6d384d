//! Correction engine facade.
//!
//! Wires the normalizer, aggregator, trigger, quality gate, and composer to
//! their injected collaborators (feedback store, content verifier, routine
//! regenerator). Every threshold comes from one [`EngineConfig`].

use crate::composer::{ComposedResponse, ResponseComposer};
use crate::config::EngineConfig;
use crate::correction::{
    CorrectionDispatcher, CorrectionTrigger, DispatchOutcome, RoutineRegenerator,
};
use crate::error::{EunoiaError, Result};
use crate::feedback::{FeedbackAggregator, FeedbackStore};
use crate::quality::{CachedVerifier, ContentVerifier, QualityGate};
use crate::signal::SignalNormalizer;
use crate::types::{
    ContentId, ContentQualityResult, CorrectionDecision, EmotionSample, FeedbackEvent, SubjectId,
    Telemetry,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

const STORE: &str = "feedback store";

/// Everything derived from a single answered question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerAssessment {
    pub sample: EmotionSample,
    pub quality: ContentQualityResult,
    pub response: ComposedResponse,
}

/// Emotion-aware adaptive correction engine
pub struct CorrectionEngine {
    config: EngineConfig,
    normalizer: SignalNormalizer,
    store: Arc<dyn FeedbackStore>,
    dispatcher: CorrectionDispatcher,
    gate: QualityGate,
    cache: Option<Arc<CachedVerifier>>,
    composer: ResponseComposer,
}

impl CorrectionEngine {
    /// Build an engine; the verifier is wrapped in a cache when enabled
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn FeedbackStore>,
        verifier: Arc<dyn ContentVerifier>,
        regenerator: Arc<dyn RoutineRegenerator>,
    ) -> Result<Self> {
        config.validate()?;

        let cache =
            CachedVerifier::from_config(verifier.clone(), &config.verifier_cache).map(Arc::new);
        let gate_verifier: Arc<dyn ContentVerifier> = match &cache {
            Some(cached) => cached.clone(),
            None => verifier,
        };

        let trigger = CorrectionTrigger::from_aggregator(FeedbackAggregator::new(&config));
        let dispatcher = CorrectionDispatcher::new(
            store.clone(),
            regenerator,
            trigger,
            config.regenerator_timeout,
        );

        info!(
            "Correction engine ready (band=[{}, {}], window={}, verifier cache={})",
            config.correction_band_low,
            config.correction_band_high,
            config.window_size,
            cache.is_some()
        );

        Ok(Self {
            normalizer: SignalNormalizer::new(&config),
            gate: QualityGate::new(gate_verifier, &config),
            composer: ResponseComposer::new(&config),
            store,
            dispatcher,
            cache,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn trigger(&self) -> &CorrectionTrigger {
        self.dispatcher.trigger()
    }

    /// Normalize raw telemetry
    pub fn normalize(&self, telemetry: &Telemetry) -> Result<EmotionSample> {
        self.normalizer.normalize(telemetry)
    }

    /// Record a piece of community feedback for a subject
    pub async fn record_feedback(
        &self,
        subject_id: SubjectId,
        sentiment: f64,
    ) -> Result<FeedbackEvent> {
        let event = FeedbackEvent::new(subject_id, sentiment)?;
        self.store
            .append(event.clone())
            .await
            .map_err(|e| e.into_dependency(STORE))?;
        debug!("Recorded feedback {} for {}", event.id, event.subject_id);
        Ok(event)
    }

    /// Correction decision for a subject, without dispatching
    pub async fn evaluate_subject(&self, subject_id: &SubjectId) -> Result<CorrectionDecision> {
        self.dispatcher.evaluate(subject_id).await
    }

    /// Evaluate a subject and regenerate its routine when correction fires
    pub async fn correct_subject(&self, subject_id: &SubjectId) -> Result<DispatchOutcome> {
        self.dispatcher.dispatch(subject_id).await
    }

    /// Vector-path trigger against a subject's current tau_neg
    pub async fn should_trigger_feedback(
        &self,
        subject_id: &SubjectId,
        vector: &[f64],
    ) -> Result<bool> {
        let decision = self.evaluate_subject(subject_id).await?;
        self.trigger().should_trigger_feedback(vector, decision.tau_neg)
    }

    /// Run the quality gate on a unit of generated content
    pub async fn evaluate_content(
        &self,
        content_id: &ContentId,
        initial_emotion_score: f64,
        is_correct: bool,
        response_time_ms: f64,
    ) -> Result<ContentQualityResult> {
        self.gate
            .evaluate(content_id, initial_emotion_score, is_correct, response_time_ms)
            .await
    }

    /// Normalize, gate, and compose feedback for one answered question
    pub async fn assess_answer(
        &self,
        content_id: &ContentId,
        telemetry: &Telemetry,
        is_correct: bool,
    ) -> Result<AnswerAssessment> {
        let response_time_ms = telemetry.response_time_ms.ok_or_else(|| {
            EunoiaError::InvalidInput(
                "response_time_ms is required to assess an answer".to_string(),
            )
        })?;

        let sample = self.normalize(telemetry)?;
        let quality = self
            .evaluate_content(content_id, sample.emotion_score, is_correct, response_time_ms)
            .await?;
        let response = self.composer.compose(
            is_correct,
            sample.band,
            response_time_ms,
            quality.emotion_drift,
        )?;

        Ok(AnswerAssessment {
            sample,
            quality,
            response,
        })
    }

    /// Forget any cached verifier score after the content was regenerated
    pub fn invalidate_content(&self, content_id: &ContentId) {
        if let Some(cache) = &self.cache {
            cache.invalidate(content_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::RecordingRegenerator;
    use crate::feedback::InMemoryFeedbackStore;
    use crate::quality::FixedVerifier;
    use crate::types::EmotionBand;

    fn engine(verifier: FixedVerifier) -> (CorrectionEngine, Arc<RecordingRegenerator>) {
        let config = EngineConfig::default();
        let regenerator = Arc::new(RecordingRegenerator::new());
        let engine = CorrectionEngine::new(
            config.clone(),
            Arc::new(InMemoryFeedbackStore::new(config.window_size)),
            Arc::new(verifier),
            regenerator.clone(),
        )
        .unwrap();
        (engine, regenerator)
    }

    #[tokio::test]
    async fn test_record_and_correct() {
        let (engine, regenerator) = engine(FixedVerifier::always(0.9));
        let subject = SubjectId::new("routine-1");

        engine.record_feedback(subject.clone(), -0.6).await.unwrap();
        engine.record_feedback(subject.clone(), 0.8).await.unwrap();

        let outcome = engine.correct_subject(&subject).await.unwrap();
        assert!(outcome.dispatched);
        assert_eq!(regenerator.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_sentiment_not_recorded() {
        let (engine, _) = engine(FixedVerifier::always(0.9));
        let err = engine
            .record_feedback(SubjectId::new("routine-1"), -3.0)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_assess_answer_composes_rest() {
        let (engine, _) = engine(FixedVerifier::always(0.99));
        let telemetry = Telemetry {
            emotion_score: Some(0.8),
            error_rate: 0.2,
            latency_count: 1.0,
            response_time_ms: Some(150_000.0),
        };

        let assessment = engine
            .assess_answer(&"q-1".into(), &telemetry, false)
            .await
            .unwrap();
        assert_eq!(assessment.sample.band, EmotionBand::High);
        assert!(assessment.quality.needs_regeneration);
        assert!(assessment.response.rest_recommended());
    }

    #[tokio::test]
    async fn test_assess_answer_requires_response_time() {
        let (engine, _) = engine(FixedVerifier::always(0.99));
        let err = engine
            .assess_answer(&"q-1".into(), &Telemetry::default(), true)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_vector_trigger_uses_subject_tau() {
        let (engine, _) = engine(FixedVerifier::always(0.9));
        let subject = SubjectId::new("routine-2");

        // No feedback: tau_neg seeds at 0.1
        let mut vector = vec![0.3; 128];
        for v in vector.iter_mut().take(20) {
            *v = -0.4;
        }
        assert!(engine.should_trigger_feedback(&subject, &vector).await.unwrap());
        assert!(engine
            .should_trigger_feedback(&subject, &vector[..100])
            .await
            .is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            window_size: 0,
            ..Default::default()
        };
        let result = CorrectionEngine::new(
            config,
            Arc::new(InMemoryFeedbackStore::new(30)),
            Arc::new(FixedVerifier::always(0.9)),
            Arc::new(RecordingRegenerator::new()),
        );
        assert!(result.is_err());
    }
}
