//! Eunoia - Emotion-Aware Adaptive Correction Engine
//!
//! Scoring and decision logic for certification-exam study content:
//! - Normalizes raw emotion/behavior telemetry into bounded scores
//! - Smooths community feedback into a negative-feedback ratio (tau_neg)
//! - Decides when a study routine must be regenerated
//! - Gates generated explanations on factual accuracy and emotion drift
//! - Selects personalized feedback categories for each answer
//!
//! # Architecture
//!
//! The crate is organized leaf-first:
//! - **Signal**: telemetry normalization (emotion score, stress score, band)
//! - **Feedback**: per-subject history and tau_neg / negative ratio statistics
//! - **Correction**: threshold policy and dispatch to a routine regenerator
//! - **Quality**: content verifier capability and the quality gate
//! - **Composer**: feedback category selection
//! - **Engine**: facade wiring all of the above to injected collaborators
//!
//! Storage, verification, and regeneration are capabilities supplied by the
//! caller; this crate never talks to a database or an LLM directly.
//!
//! # Example
//!
//! ```rust,no_run
//! use eunoia_core::{
//!     CorrectionEngine, EngineConfig, FixedVerifier, InMemoryFeedbackStore,
//!     RecordingRegenerator, SubjectId,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> eunoia_core::Result<()> {
//! let config = EngineConfig::default();
//! let engine = CorrectionEngine::new(
//!     config.clone(),
//!     Arc::new(InMemoryFeedbackStore::new(config.window_size)),
//!     Arc::new(FixedVerifier::always(0.9)),
//!     Arc::new(RecordingRegenerator::new()),
//! )?;
//!
//! let routine = SubjectId::new("routine-42");
//! engine.record_feedback(routine.clone(), -0.4).await?;
//!
//! let outcome = engine.correct_subject(&routine).await?;
//! println!("tau_neg = {:.3}", outcome.decision.tau_neg);
//! # Ok(())
//! # }
//! ```

pub mod composer;
pub mod config;
pub mod correction;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod quality;
pub mod signal;
pub mod types;

// Re-export commonly used types
pub use composer::{ComposedResponse, MessageCategory, Recommendation, ResponseComposer};
pub use config::EngineConfig;
pub use correction::{
    CorrectionDispatcher, CorrectionTrigger, DispatchOutcome, RecordingRegenerator,
    RoutineRegenerator,
};
pub use engine::{AnswerAssessment, CorrectionEngine};
pub use error::{EunoiaError, Result};
pub use feedback::{FeedbackAggregator, FeedbackStore, InMemoryFeedbackStore};
pub use quality::{
    CachedVerifier, ContentVerifier, DriftPolicy, EnsembleVerifier, FixedVerifier, QualityGate,
};
pub use signal::SignalNormalizer;
pub use types::{
    ContentId, ContentQualityResult, CorrectionDecision, EmotionBand, EmotionSample,
    FeedbackEvent, SubjectId, Telemetry,
};
