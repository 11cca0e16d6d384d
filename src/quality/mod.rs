//! Quality gating of generated content.
//!
//! - **QualityGate**: fact-score and emotion-drift gates
//! - **ContentVerifier**: pluggable factual-accuracy capability
//! - **EnsembleVerifier**: averages two or more verifiers
//! - **CachedVerifier**: LRU + TTL memoization of verifier scores
//! - **FixedVerifier**: deterministic score table

pub mod cache;
pub mod gate;
pub mod verifier;

pub use cache::{CacheStats, CachedVerifier};
pub use gate::{DriftPolicy, QualityGate};
pub use verifier::{ContentVerifier, EnsembleVerifier, FixedVerifier};
