//! Core types shared by the feature, affect, ability and session layers

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::affect::EmotionalState;
use crate::error::{AdaptError, Result};

/// Raw audio data representation (mono, f32 samples)
#[derive(Debug, Clone, Default)]
pub struct AudioData {
    /// Audio samples, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 16000)
    pub sample_rate: u32,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Rejects buffers that contain NaN or infinite samples.
    ///
    /// Silence, zero length and a zero sample rate are all accepted; the
    /// feature extractor degrades those to neutral values on its own.
    pub fn validate(&self) -> Result<()> {
        match self.samples.iter().position(|s| !s.is_finite()) {
            Some(index) => Err(AdaptError::InvalidAudio(format!(
                "non-finite sample at index {}",
                index
            ))),
            None => Ok(()),
        }
    }
}

/// One answered question, as produced by the external answer checker.
///
/// `is_correct` is optional only so that malformed input can be represented
/// and rejected; the estimator refuses events without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEvent {
    #[serde(alias = "questionId", alias = "id")]
    pub question_id: String,
    #[serde(default, alias = "isCorrect", alias = "correct")]
    pub is_correct: Option<bool>,
    #[serde(default, alias = "responseTimeMs", alias = "responseTime")]
    pub response_time_ms: u64,
    #[serde(alias = "itemDifficulty", alias = "difficulty")]
    pub item_difficulty: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, alias = "emotionalState")]
    pub emotional_state: Option<EmotionalState>,
}

impl ResponseEvent {
    pub fn new(question_id: impl Into<String>, is_correct: bool, item_difficulty: f64) -> Self {
        Self {
            question_id: question_id.into(),
            is_correct: Some(is_correct),
            response_time_ms: 0,
            item_difficulty,
            confidence: None,
            emotional_state: None,
        }
    }

    pub fn with_response_time(mut self, response_time_ms: u64) -> Self {
        self.response_time_ms = response_time_ms;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_emotional_state(mut self, state: EmotionalState) -> Self {
        self.emotional_state = Some(state);
        self
    }
}

/// Confidence assumed when the caller did not supply one.
pub const DEFAULT_RESPONSE_CONFIDENCE: f64 = 0.5;

/// Metric appended to the performance history once an event has been applied.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceRecord {
    pub question_id: String,
    pub is_correct: bool,
    pub response_time_ms: u64,
    pub item_difficulty: f64,
    pub confidence: f64,
    pub emotional_state: Option<EmotionalState>,
    pub ability_after: f64,
    pub standard_error_after: f64,
    pub timestamp_ms: u64,
}

/// Anything that can be placed on a difficulty scale shared with ability.
pub trait ItemDifficulty {
    fn difficulty(&self) -> f64;

    /// Question id matched against answered responses; `None` never counts as answered.
    fn item_id(&self) -> Option<&str> {
        None
    }
}

/// Minimal question descriptor handed in by the content layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    #[serde(alias = "questionId")]
    pub id: String,
    #[serde(alias = "itemDifficulty")]
    pub difficulty: f64,
}

impl CandidateItem {
    pub fn new(id: impl Into<String>, difficulty: f64) -> Self {
        Self {
            id: id.into(),
            difficulty,
        }
    }
}

impl ItemDifficulty for CandidateItem {
    fn difficulty(&self) -> f64 {
        self.difficulty
    }

    fn item_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// Milliseconds since the Unix epoch; 0 if the clock is before 1970.
pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
