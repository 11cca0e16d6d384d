//! Eunoia - offline evaluation CLI for the correction engine
//!
//! Runs the scoring and decision logic against recorded telemetry and
//! feedback so thresholds can be inspected without the web layer.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use eunoia_core::{
    signal, CorrectionEngine, CorrectionTrigger, DriftPolicy, EmotionBand, EngineConfig,
    FeedbackAggregator, FeedbackEvent, FeedbackStore, FixedVerifier, InMemoryFeedbackStore,
    RecordingRegenerator, ResponseComposer, SignalNormalizer, Telemetry,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eunoia")]
#[command(about = "Emotion-aware adaptive correction engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Engine config file (TOML); EUNOIA__* env vars override it
    #[arg(short, long, env = "EUNOIA_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize telemetry into emotion score, stress score, and band
    Stress {
        /// Emotion score (defaults when omitted)
        #[arg(long)]
        emotion: Option<f64>,

        /// Error rate in [0, 1]
        #[arg(long, default_value = "0")]
        error_rate: f64,

        /// Number of slow responses
        #[arg(long, default_value = "0")]
        latency_count: f64,
    },

    /// Show the emotion band for a score
    Band {
        score: f64,
    },

    /// Compute tau_neg over comma-separated negative ratios (oldest first)
    Tau {
        #[arg(value_delimiter = ',', allow_hyphen_values = true)]
        ratios: Vec<f64>,

        /// Override the smoothing factor
        #[arg(long)]
        lambda: Option<f64>,
    },

    /// Evaluate a fixed-width feedback vector (JSON array file)
    Vector {
        file: PathBuf,

        /// tau_neg to test the vector against
        #[arg(long)]
        tau: f64,
    },

    /// Compute emotion drift for an answer
    Drift {
        #[arg(long)]
        emotion: f64,

        /// The answer was correct
        #[arg(long)]
        correct: bool,

        #[arg(long)]
        response_time_ms: f64,

        /// Fact score to gate against
        #[arg(long)]
        fact_score: Option<f64>,
    },

    /// Select feedback categories for an answer
    Compose {
        #[arg(long)]
        emotion: f64,

        /// The answer was correct
        #[arg(long)]
        correct: bool,

        #[arg(long)]
        response_time_ms: f64,
    },

    /// Replay feedback events (JSON lines) and print correction decisions
    Replay {
        file: PathBuf,

        /// Score the fixed verifier reports for every content unit
        #[arg(long, default_value = "0.9")]
        verifier_score: f64,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Serialize)]
struct TauReport {
    tau_neg: f64,
    raw: f64,
    should_correct: bool,
    magnitude: f64,
}

#[derive(Serialize)]
struct VectorReport {
    negative_ratio: f64,
    tau_neg: f64,
    should_trigger: bool,
}

#[derive(Serialize)]
struct DriftReport {
    emotion_drift: f64,
    drift_exceeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    needs_regeneration: Option<bool>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!(
        "eunoia={level},eunoia_core={level}",
        level = level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Eunoia v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = EngineConfig::load(cli.config.as_deref()).context("Failed to load engine config")?;

    match cli.command {
        Commands::Stress {
            emotion,
            error_rate,
            latency_count,
        } => {
            let sample = SignalNormalizer::new(&config).normalize(&Telemetry {
                emotion_score: emotion,
                error_rate,
                latency_count,
                response_time_ms: None,
            })?;
            print_json(&sample)
        }

        Commands::Band { score } => {
            println!("{}", band_for(&config, score)?);
            Ok(())
        }

        Commands::Tau { ratios, lambda } => {
            let mut aggregator = FeedbackAggregator::new(&config);
            if let Some(lambda) = lambda {
                if !(lambda > 0.0 && lambda <= 1.0) {
                    bail!("lambda must be in (0, 1], got {}", lambda);
                }
                aggregator = aggregator.with_lambda(lambda);
            }
            let raw = aggregator.smoothed_neg_ratio(&ratios)?;
            let trigger = CorrectionTrigger::from_aggregator(aggregator);
            let decision = trigger.decide_from_ratios(&ratios)?;
            print_json(&TauReport {
                tau_neg: decision.tau_neg,
                raw,
                should_correct: decision.should_correct,
                magnitude: decision.magnitude,
            })
        }

        Commands::Vector { file, tau } => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let vector: Vec<f64> = serde_json::from_str(&contents)
                .with_context(|| format!("{} is not a JSON array of numbers", file.display()))?;

            let trigger = CorrectionTrigger::new(&config);
            let negative_ratio = trigger.aggregator().negative_ratio(&vector)?;
            print_json(&VectorReport {
                negative_ratio,
                tau_neg: tau,
                should_trigger: trigger.should_trigger_feedback(&vector, tau)?,
            })
        }

        Commands::Drift {
            emotion,
            correct,
            response_time_ms,
            fact_score,
        } => {
            let policy = DriftPolicy::new(&config);
            let emotion_drift = policy.emotion_drift(emotion, correct, response_time_ms)?;
            print_json(&DriftReport {
                emotion_drift,
                drift_exceeded: policy.drift_exceeded(emotion_drift),
                needs_regeneration: fact_score
                    .map(|score| policy.needs_regeneration(score, emotion_drift)),
            })
        }

        Commands::Compose {
            emotion,
            correct,
            response_time_ms,
        } => {
            let emotion = SignalNormalizer::new(&config).emotion_score(Some(emotion))?;
            let drift =
                DriftPolicy::new(&config).emotion_drift(emotion, correct, response_time_ms)?;
            let response = ResponseComposer::new(&config).compose(
                correct,
                signal::band(emotion),
                response_time_ms,
                drift,
            )?;
            print_json(&response)
        }

        Commands::Replay {
            file,
            verifier_score,
        } => replay(config, file, verifier_score).await,

        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Band for a CLI-supplied score, validated like any other telemetry
fn band_for(config: &EngineConfig, score: f64) -> Result<EmotionBand> {
    let score = SignalNormalizer::new(config).emotion_score(Some(score))?;
    Ok(signal::band(score))
}

/// Feed recorded events through an in-memory store and report decisions
async fn replay(config: EngineConfig, file: PathBuf, verifier_score: f64) -> Result<()> {
    let contents = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let store = Arc::new(InMemoryFeedbackStore::new(config.window_size));
    let mut count = 0usize;
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: FeedbackEvent = serde_json::from_str(line)
            .with_context(|| {
                format!("{}:{}: invalid feedback event", file.display(), line_no + 1)
            })?;
        store
            .append(event)
            .await
            .with_context(|| {
                format!("{}:{}: rejected feedback event", file.display(), line_no + 1)
            })?;
        count += 1;
    }
    info!("Replayed {} feedback events from {}", count, file.display());

    let regenerator = Arc::new(RecordingRegenerator::new());
    let engine = CorrectionEngine::new(
        config,
        store.clone(),
        Arc::new(FixedVerifier::always(verifier_score)),
        regenerator.clone(),
    )?;

    for subject in store.subjects().await {
        let outcome = engine.correct_subject(&subject).await?;
        println!("{}", serde_json::to_string(&outcome)?);
    }

    info!("{} routines flagged for regeneration", regenerator.calls().len());
    Ok(())
}
