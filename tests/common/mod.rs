//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use eunoia_core::{
    ContentId, ContentVerifier, CorrectionEngine, EngineConfig, EunoiaError, FixedVerifier,
    InMemoryFeedbackStore, RecordingRegenerator, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Engine over an in-memory store, a fixed verifier, and a recording regenerator
pub fn create_test_engine(
    verifier: Arc<dyn ContentVerifier>,
) -> (CorrectionEngine, Arc<RecordingRegenerator>) {
    create_test_engine_with(EngineConfig::default(), verifier)
}

pub fn create_test_engine_with(
    config: EngineConfig,
    verifier: Arc<dyn ContentVerifier>,
) -> (CorrectionEngine, Arc<RecordingRegenerator>) {
    let regenerator = Arc::new(RecordingRegenerator::new());
    let engine = CorrectionEngine::new(
        config.clone(),
        Arc::new(InMemoryFeedbackStore::new(config.window_size)),
        verifier,
        regenerator.clone(),
    )
    .expect("Failed to create test engine");
    (engine, regenerator)
}

pub fn fixed_verifier(score: f64) -> Arc<dyn ContentVerifier> {
    Arc::new(FixedVerifier::always(score))
}

/// 128-sample vector with `negatives` entries well below the cutoff
pub fn vector_with_negatives(negatives: usize) -> Vec<f64> {
    let mut vector = vec![0.4; 128];
    for v in vector.iter_mut().take(negatives) {
        *v = -0.7;
    }
    vector
}

/// Verifier that counts calls and always returns the same score
pub struct CountingVerifier {
    pub calls: AtomicUsize,
    score: f64,
}

impl CountingVerifier {
    pub fn new(score: f64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            score,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentVerifier for CountingVerifier {
    async fn verify(&self, _content_id: &ContentId) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.score)
    }
}

/// Verifier whose upstream is always down
pub struct UnavailableVerifier;

#[async_trait]
impl ContentVerifier for UnavailableVerifier {
    async fn verify(&self, content_id: &ContentId) -> Result<f64> {
        Err(EunoiaError::Other(format!("upstream unavailable for {}", content_id)))
    }
}
