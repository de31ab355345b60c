//! Heuristic affect scoring from acoustic features.
//!
//! Scores are pedagogical tuning signals, not clinical labels. Each analysed
//! response is stored unsmoothed; the smoothed view and the trend are derived
//! reads over the session history.

mod trend;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AffectConfig;
use crate::features::FeatureVector;
use crate::types::unix_millis;

pub use trend::{EmotionFrequency, EmotionalTrend, TrendDirection};

/// Coarse label picked from the four derived emotion scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Calm,
    Engaged,
    Frustrated,
    Confused,
}

impl Emotion {
    /// Tie-break precedence, highest first.
    pub const PRECEDENCE: [Emotion; 4] = [
        Emotion::Calm,
        Emotion::Engaged,
        Emotion::Frustrated,
        Emotion::Confused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Calm => "calm",
            Emotion::Engaged => "engaged",
            Emotion::Frustrated => "frustrated",
            Emotion::Confused => "confused",
        }
    }

    fn rank(&self) -> usize {
        match self {
            Emotion::Calm => 0,
            Emotion::Engaged => 1,
            Emotion::Frustrated => 2,
            Emotion::Confused => 3,
        }
    }
}

impl Display for Emotion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four scores compared when choosing the dominant emotion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionScores {
    pub calm: f64,
    pub engaged: f64,
    pub frustrated: f64,
    pub confused: f64,
}

impl EmotionScores {
    pub fn from_dimensions(confidence: f64, frustration: f64, engagement: f64) -> Self {
        Self {
            calm: (1.0 - frustration) * confidence,
            engaged: engagement * confidence,
            frustrated: frustration,
            confused: (1.0 - confidence) * (1.0 - engagement),
        }
    }

    pub fn score(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Calm => self.calm,
            Emotion::Engaged => self.engaged,
            Emotion::Frustrated => self.frustrated,
            Emotion::Confused => self.confused,
        }
    }

    /// Highest-scoring label; equal scores resolve in [`Emotion::PRECEDENCE`] order.
    pub fn dominant(&self) -> Emotion {
        let mut best = Emotion::Calm;
        for emotion in Emotion::PRECEDENCE.into_iter().skip(1) {
            if self.score(emotion) > self.score(best) {
                best = emotion;
            }
        }
        best
    }
}

/// Affect inferred from one spoken response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AffectReading")]
pub struct EmotionalState {
    pub confidence: f64,
    pub frustration: f64,
    pub engagement: f64,
    pub arousal: f64,
    pub valence: f64,
    pub dominant_emotion: Emotion,
    pub scores: EmotionScores,
    pub timestamp_ms: u64,
}

impl EmotionalState {
    /// Builds a state from the three primary dimensions, clamping each to [0, 1].
    pub fn from_dimensions(
        confidence: f64,
        frustration: f64,
        engagement: f64,
        timestamp_ms: u64,
    ) -> Self {
        let confidence = clamp01(confidence);
        let frustration = clamp01(frustration);
        let engagement = clamp01(engagement);
        let scores = EmotionScores::from_dimensions(confidence, frustration, engagement);
        Self {
            confidence,
            frustration,
            engagement,
            arousal: (frustration + engagement) / 2.0,
            valence: 1.0 - frustration,
            dominant_emotion: scores.dominant(),
            scores,
            timestamp_ms,
        }
    }
}

/// Wire form of an emotional state; derived fields are always recomputed.
#[derive(Debug, Clone, Deserialize)]
struct AffectReading {
    confidence: f64,
    frustration: f64,
    engagement: f64,
    #[serde(default, alias = "timestamp", alias = "timestampMs")]
    timestamp_ms: u64,
}

impl From<AffectReading> for EmotionalState {
    fn from(reading: AffectReading) -> Self {
        EmotionalState::from_dimensions(
            reading.confidence,
            reading.frustration,
            reading.engagement,
            reading.timestamp_ms,
        )
    }
}

/// Mean of the primary dimensions over the smoothing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmoothedAffect {
    pub confidence: f64,
    pub frustration: f64,
    pub engagement: f64,
    pub samples: usize,
}

/// Per-session affect analyzer.
#[derive(Debug, Clone, Default)]
pub struct AffectAnalyzer {
    config: AffectConfig,
    history: Vec<EmotionalState>,
}

impl AffectAnalyzer {
    pub fn new(config: AffectConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &AffectConfig {
        &self.config
    }

    pub fn analyze(&mut self, features: &FeatureVector) -> EmotionalState {
        self.analyze_at(features, unix_millis())
    }

    /// Scores `features`, appends the result to the history and returns it.
    pub fn analyze_at(&mut self, features: &FeatureVector, timestamp_ms: u64) -> EmotionalState {
        let state = self.score(features, timestamp_ms);
        debug!(
            confidence = state.confidence,
            frustration = state.frustration,
            engagement = state.engagement,
            dominant = %state.dominant_emotion,
            "emotional state analysed"
        );
        self.history.push(state.clone());
        state
    }

    /// Pure scoring without touching the history.
    pub fn score(&self, features: &FeatureVector, timestamp_ms: u64) -> EmotionalState {
        EmotionalState::from_dimensions(
            self.confidence(features),
            self.frustration(features),
            self.engagement(features),
            timestamp_ms,
        )
    }

    fn confidence(&self, f: &FeatureVector) -> f64 {
        let c = &self.config;
        clamp01(
            0.5 - 0.4 * f.pause_ratio + 0.2 * flag(f.speech_rate > c.fluent_speech_rate)
                - 0.2 * f.voice_tension
                + 0.1 * flag(f.energy_db > c.audible_energy_db),
        )
    }

    fn frustration(&self, f: &FeatureVector) -> f64 {
        let c = &self.config;
        clamp01(
            0.3 * flag(f.pitch_hz > c.pitch_ceiling_hz)
                + 0.3 * flag(f.energy_db > c.agitated_energy_db)
                + 0.2 * flag(f.speech_rate > c.rushed_speech_rate)
                + 0.2 * f.voice_tension,
        )
    }

    fn engagement(&self, f: &FeatureVector) -> f64 {
        let c = &self.config;
        clamp01(
            0.5 + 0.2 * flag(within(f.spectral_centroid, c.centroid_band_hz))
                + 0.2 * flag(within(f.energy_db, c.energy_band_db))
                + 0.1 * flag(within(f.speech_rate, c.speech_rate_band))
                - 0.15 * f.pause_ratio,
        )
    }

    pub fn history(&self) -> &[EmotionalState] {
        &self.history
    }

    pub fn current(&self) -> Option<&EmotionalState> {
        self.history.last()
    }

    /// Mean of the last `smoothing_window` states, newest included.
    pub fn smoothed(&self) -> Option<SmoothedAffect> {
        let window = self.config.smoothing_window.max(1);
        let start = self.history.len().saturating_sub(window);
        let recent = &self.history[start..];
        if recent.is_empty() {
            return None;
        }
        let n = recent.len() as f64;
        Some(SmoothedAffect {
            confidence: recent.iter().map(|s| s.confidence).sum::<f64>() / n,
            frustration: recent.iter().map(|s| s.frustration).sum::<f64>() / n,
            engagement: recent.iter().map(|s| s.engagement).sum::<f64>() / n,
            samples: recent.len(),
        })
    }

    pub fn trend(&self, horizon_ms: u64) -> Option<EmotionalTrend> {
        self.trend_at(horizon_ms, unix_millis())
    }

    /// Trend over states stamped strictly after `now_ms - horizon_ms`; a horizon
    /// reaching back past the epoch covers the whole history.
    pub fn trend_at(&self, horizon_ms: u64, now_ms: u64) -> Option<EmotionalTrend> {
        let cutoff = now_ms.checked_sub(horizon_ms);
        let recent: Vec<&EmotionalState> = self
            .history
            .iter()
            .filter(|state| cutoff.map_or(true, |cutoff| state.timestamp_ms > cutoff))
            .collect();
        EmotionalTrend::from_states(horizon_ms, &recent, self.config.trend_dead_band)
    }

    pub fn reset(&mut self) {
        self.history.clear();
        debug!("affect analyzer reset");
    }
}

fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

fn within(value: f64, (low, high): (f64, f64)) -> bool {
    value > low && value < high
}
