use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::affect::{AffectAnalyzer, EmotionalState};
use crate::audio::read_wav;
use crate::config::AppConfig;
use crate::features::{FeatureExtractor, FeatureVector};
use crate::session::{ResponseOutcome, SessionAdapter, SessionStatistics};
use crate::types::{unix_millis, CandidateItem, ResponseEvent};

/// Path length used when `--items` is given without `--path-length`.
pub const DEFAULT_PATH_LENGTH: usize = 5;

#[derive(Parser, Debug)]
#[command(
    name = "voxadapt",
    version,
    about = "Adaptive difficulty and affect analysis for spoken answers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract features from a WAV file and score the speaker's affect.
    Analyze(AnalyzeArgs),
    /// Feed a recorded list of response events through a fresh session.
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Mono or multi-channel WAV file.
    #[arg(value_name = "WAV")]
    pub input: PathBuf,
    /// JSON configuration file; defaults apply to anything omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// JSON array of response events; each may name an `audio` WAV file.
    #[arg(value_name = "EVENTS_JSON")]
    pub events: PathBuf,
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Seed for the difficulty jitter, overriding the configuration.
    #[arg(long)]
    pub seed: Option<u64>,
    /// JSON array of candidate items to build a personalized path from.
    #[arg(long, value_name = "ITEMS_JSON")]
    pub items: Option<PathBuf>,
    #[arg(long = "path-length", requires = "items")]
    pub path_length: Option<usize>,
}

/// A response event as stored in a replay file.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayEvent {
    #[serde(flatten)]
    pub event: ResponseEvent,
    /// WAV file, relative paths resolved against the events file.
    #[serde(default)]
    pub audio: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeReport {
    pub features: FeatureVector,
    pub emotional_state: EmotionalState,
}

#[derive(Debug, Serialize)]
pub struct RecordedResponse {
    pub question_id: String,
    #[serde(flatten)]
    pub outcome: ResponseOutcome,
    /// Set when the event's audio could not be read; the answer was still recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RejectedResponse {
    pub question_id: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub responses: Vec<RecordedResponse>,
    pub rejected: Vec<RejectedResponse>,
    pub statistics: SessionStatistics,
    pub next_difficulty: f64,
    pub path: Option<Vec<CandidateItem>>,
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_path(path),
        None => Ok(AppConfig::default()),
    }
}

fn ensure_file(path: &Path, what: &str) -> Result<()> {
    ensure!(path.is_file(), "{} is not a readable file: {}", what, path.display());
    Ok(())
}

pub fn analyze(args: &AnalyzeArgs) -> Result<AnalyzeReport> {
    ensure_file(&args.input, "Input WAV")?;
    let config = load_config(args.config.as_deref())?;
    let audio = read_wav(&args.input)?;
    audio.validate().context("Input WAV cannot be analysed")?;

    let features = FeatureExtractor::with_config(config.features)?.extract(&audio);
    let emotional_state = AffectAnalyzer::new(config.affect).score(&features, unix_millis());
    info!(
        input = %args.input.display(),
        duration_secs = features.duration_secs,
        dominant = %emotional_state.dominant_emotion,
        "analysis complete"
    );
    Ok(AnalyzeReport {
        features,
        emotional_state,
    })
}

pub fn replay(args: &ReplayArgs) -> Result<ReplayReport> {
    ensure_file(&args.events, "Events file")?;
    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.estimator.seed = Some(seed);
    }

    let raw = fs::read_to_string(&args.events)
        .with_context(|| format!("Failed to read events file: {}", args.events.display()))?;
    let events: Vec<ReplayEvent> =
        serde_json::from_str(&raw).context("Failed to parse response events")?;
    let base_dir = args.events.parent().unwrap_or_else(|| Path::new("."));

    let mut session = SessionAdapter::new(config)?;
    let mut responses = Vec::new();
    let mut rejected = Vec::new();
    for ReplayEvent { event, audio } in events {
        let question_id = event.question_id.clone();
        let mut audio_error = None;
        let audio = match audio {
            Some(path) => match read_wav(base_dir.join(&path)) {
                Ok(audio) => Some(audio),
                Err(err) => {
                    let message = format!("{:#}", err);
                    warn!(
                        question = %question_id,
                        audio = %path.display(),
                        error = %message,
                        "recording event without audio"
                    );
                    audio_error = Some(message);
                    None
                }
            },
            None => None,
        };
        match session.record_response(event, audio.as_ref()) {
            Ok(outcome) => responses.push(RecordedResponse {
                question_id,
                outcome,
                audio_error,
            }),
            Err(err) => {
                warn!(question = %question_id, error = %err, "event skipped");
                rejected.push(RejectedResponse {
                    question_id,
                    error: err.to_string(),
                });
            }
        }
    }

    let path = match &args.items {
        Some(items_path) => {
            ensure_file(items_path, "Items file")?;
            let raw = fs::read_to_string(items_path).with_context(|| {
                format!("Failed to read items file: {}", items_path.display())
            })?;
            let items: Vec<CandidateItem> =
                serde_json::from_str(&raw).context("Failed to parse candidate items")?;
            let length = args.path_length.unwrap_or(DEFAULT_PATH_LENGTH);
            Some(session.build_personalized_path(items, length)?)
        }
        None => None,
    };

    let statistics = session.statistics();
    let next_difficulty = session.next_difficulty();
    info!(
        recorded = responses.len(),
        rejected = rejected.len(),
        ability = statistics.ability,
        "replay complete"
    );
    Ok(ReplayReport {
        responses,
        rejected,
        statistics,
        next_difficulty,
        path,
    })
}
