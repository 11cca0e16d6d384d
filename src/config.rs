//! Engine configuration
//!
//! Every threshold used by the correction engine lives here so the
//! normalizer, aggregator, trigger, and quality gate share one source.
//!
//! Configuration is resolved in layers:
//! 1. Built-in defaults
//! 2. Optional TOML file
//! 3. `EUNOIA__*` environment variables (e.g. `EUNOIA__FACT_SCORE_MIN=0.9`,
//!    `EUNOIA__VERIFIER_CACHE__CAPACITY=64`)

use crate::error::{EunoiaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "EUNOIA";

/// Thresholds and budgets for the correction engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Inclusive lower bound of the correction band
    pub correction_band_low: f64,

    /// Inclusive upper bound of the correction band
    pub correction_band_high: f64,

    /// Exponential smoothing factor for tau_neg
    pub smoothing_lambda: f64,

    /// Number of most recent events considered (and retained) per subject
    pub window_size: usize,

    /// tau_neg seed when a subject has no feedback
    pub default_seed: f64,

    /// Required length of the fixed-width feedback vector
    pub feature_vector_len: usize,

    /// Sentiment strictly below this counts as negative
    pub negative_sentiment_cutoff: f64,

    /// Content with a lower fact score is regenerated
    pub fact_score_min: f64,

    /// Content with a larger emotion drift is regenerated
    pub emotion_drift_max: f64,

    /// Responses slower than this incur the slow-response drift penalty
    pub slow_response_ms: u64,

    /// Response times above this are treated as data-entry errors
    pub response_time_ceiling_ms: u64,

    /// Emotion score assumed when telemetry omits it
    pub default_emotion_score: f64,

    /// Slow-response count at which normalized latency saturates
    pub latency_saturation: f64,

    /// Time budget for a content verifier call (seconds)
    #[serde(with = "serde_duration")]
    pub verifier_timeout: Duration,

    /// Time budget for a routine regenerator call (seconds)
    #[serde(with = "serde_duration")]
    pub regenerator_timeout: Duration,

    /// Verifier result cache
    pub verifier_cache: VerifierCacheConfig,
}

/// Settings for the LRU cache in front of the content verifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierCacheConfig {
    pub enabled: bool,
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for VerifierCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 256,
            ttl_secs: 3600, // 1 hour
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            correction_band_low: 0.10,
            correction_band_high: 0.30,
            smoothing_lambda: 0.3,
            window_size: 30,
            default_seed: 0.1,
            feature_vector_len: 128,
            negative_sentiment_cutoff: -0.1,
            fact_score_min: 0.85,
            emotion_drift_max: 0.15,
            slow_response_ms: 120_000,         // 2 minutes
            response_time_ceiling_ms: 86_400_000, // 24 hours
            default_emotion_score: 0.5,
            latency_saturation: 10.0,
            verifier_timeout: Duration::from_secs(30),
            regenerator_timeout: Duration::from_secs(60),
            verifier_cache: VerifierCacheConfig::default(),
        }
    }
}

// Custom serde module for Duration (serialize/deserialize as seconds)
mod serde_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve defaults, an optional file, and `EUNOIA__*` overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("Loading engine config from {}", path.display());
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Toml),
            );
        }

        let config: EngineConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EunoiaError::Other(e.to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        check_unit("correction_band_low", self.correction_band_low)?;
        check_unit("correction_band_high", self.correction_band_high)?;
        if self.correction_band_low >= self.correction_band_high {
            return Err(invalid(
                "correction_band_low must be below correction_band_high",
            ));
        }

        if !(self.smoothing_lambda > 0.0 && self.smoothing_lambda <= 1.0) {
            return Err(invalid("smoothing_lambda must be in (0, 1]"));
        }

        if self.window_size == 0 {
            return Err(invalid("window_size must be at least 1"));
        }
        if self.feature_vector_len == 0 {
            return Err(invalid("feature_vector_len must be at least 1"));
        }

        check_unit("default_seed", self.default_seed)?;
        check_unit("fact_score_min", self.fact_score_min)?;
        check_unit("emotion_drift_max", self.emotion_drift_max)?;
        check_unit("default_emotion_score", self.default_emotion_score)?;

        if !(-1.0..=1.0).contains(&self.negative_sentiment_cutoff) {
            return Err(invalid("negative_sentiment_cutoff must be in [-1, 1]"));
        }

        if !(self.latency_saturation.is_finite() && self.latency_saturation > 0.0) {
            return Err(invalid("latency_saturation must be positive"));
        }

        if self.slow_response_ms >= self.response_time_ceiling_ms {
            return Err(invalid(
                "slow_response_ms must be below response_time_ceiling_ms",
            ));
        }

        if self.verifier_timeout.is_zero() || self.regenerator_timeout.is_zero() {
            return Err(invalid("dependency timeouts must be at least 1 second"));
        }

        if self.verifier_cache.enabled && self.verifier_cache.capacity == 0 {
            return Err(invalid("verifier_cache.capacity must be at least 1"));
        }

        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(&format!("{} must be in [0, 1], got {}", name, value)))
    }
}

fn invalid(message: &str) -> EunoiaError {
    EunoiaError::Config(config::ConfigError::Message(message.to_string()))
}
