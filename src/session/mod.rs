//! Per-learner coordinator tying feature extraction, affect analysis and
//! ability estimation together.

mod answer;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::affect::{AffectAnalyzer, EmotionalState, EmotionalTrend, SmoothedAffect};
use crate::config::AppConfig;
use crate::error::Result;
use crate::features::{FeatureExtractor, FeatureVector};
use crate::irt::{AbilityEstimator, AbilityUpdate, PerformanceStatistics, SkillLevel};
use crate::types::{unix_millis, AudioData, ItemDifficulty, ResponseEvent};

pub use answer::{edit_distance, AnswerChecker};

/// Horizon used for the emotional trend in session statistics.
pub const DEFAULT_TREND_HORIZON_MS: u64 = 60_000;

/// What happened to one recorded response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseOutcome {
    pub update: AbilityUpdate,
    /// Present when audio accompanied the event and could be analysed.
    pub features: Option<FeatureVector>,
    pub emotional_state: Option<EmotionalState>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatistics {
    pub total_responses: usize,
    pub accuracy: f64,
    pub ability: f64,
    pub standard_error: f64,
    pub skill_level: SkillLevel,
    pub mean_response_time_ms: f64,
    pub mean_confidence: f64,
    pub performance: Option<PerformanceStatistics>,
    pub current_emotion: Option<EmotionalState>,
    pub smoothed_affect: Option<SmoothedAffect>,
    pub emotional_trend: Option<EmotionalTrend>,
}

/// One learner session. Owns its estimator and emotional history exclusively.
pub struct SessionAdapter {
    extractor: FeatureExtractor,
    analyzer: AffectAnalyzer,
    estimator: AbilityEstimator,
    checker: AnswerChecker,
    trend_horizon_ms: u64,
}

impl SessionAdapter {
    /// Builds a session after checking every section of `config`.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.affect.validate()?;
        Ok(Self {
            extractor: FeatureExtractor::with_config(config.features)?,
            analyzer: AffectAnalyzer::new(config.affect),
            estimator: AbilityEstimator::new(config.estimator)?,
            checker: AnswerChecker::default(),
            trend_horizon_ms: DEFAULT_TREND_HORIZON_MS,
        })
    }

    pub fn with_answer_checker(mut self, checker: AnswerChecker) -> Self {
        self.checker = checker;
        self
    }

    pub fn with_trend_horizon(mut self, horizon_ms: u64) -> Self {
        self.trend_horizon_ms = horizon_ms;
        self
    }

    pub fn estimator(&self) -> &AbilityEstimator {
        &self.estimator
    }

    pub fn analyzer(&self) -> &AffectAnalyzer {
        &self.analyzer
    }

    pub fn record_response(
        &mut self,
        event: ResponseEvent,
        audio: Option<&AudioData>,
    ) -> Result<ResponseOutcome> {
        self.record_response_at(event, audio, unix_millis())
    }

    /// Records `event`, analysing `audio` first when it is supplied.
    ///
    /// The event is validated before anything is touched, so a rejected event
    /// leaves both the ability state and the emotional history unchanged.
    /// Audio with non-finite samples is skipped with a warning; the response
    /// itself is still applied.
    pub fn record_response_at(
        &mut self,
        mut event: ResponseEvent,
        audio: Option<&AudioData>,
        timestamp_ms: u64,
    ) -> Result<ResponseOutcome> {
        if let Err(err) = self.estimator.validate_event(&event) {
            warn!(question = %event.question_id, error = %err, "rejecting response event");
            return Err(err);
        }

        let mut features = None;
        let mut analysed = None;
        if let Some(audio) = audio {
            match audio.validate() {
                Ok(()) => {
                    let vector = self.extractor.extract(audio);
                    let state = self.analyzer.analyze_at(&vector, timestamp_ms);
                    features = Some(vector);
                    analysed = Some(state);
                }
                Err(err) => {
                    warn!(question = %event.question_id, error = %err, "skipping affect analysis");
                }
            }
        }
        if event.emotional_state.is_none() {
            event.emotional_state = analysed.clone();
        }

        let update = self.estimator.update(&event)?;
        Ok(ResponseOutcome {
            update,
            features,
            emotional_state: analysed,
        })
    }

    /// Checks `response` against `expected` and records the result.
    pub fn check_and_record<S: AsRef<str>>(
        &mut self,
        question_id: &str,
        response: &str,
        expected: &[S],
        item_difficulty: f64,
        response_time_ms: u64,
        audio: Option<&AudioData>,
    ) -> Result<ResponseOutcome> {
        let correct = self.checker.check(response, expected);
        debug!(question = %question_id, correct, "answer checked");
        let event = ResponseEvent::new(question_id, correct, item_difficulty)
            .with_response_time(response_time_ms);
        self.record_response(event, audio)
    }

    pub fn next_difficulty(&mut self) -> f64 {
        self.estimator.next_difficulty()
    }

    pub fn build_personalized_path<T: ItemDifficulty>(
        &mut self,
        items: Vec<T>,
        length: usize,
    ) -> Result<Vec<T>> {
        self.estimator.build_personalized_path(items, length)
    }

    pub fn statistics(&self) -> SessionStatistics {
        self.statistics_at(unix_millis())
    }

    pub fn statistics_at(&self, now_ms: u64) -> SessionStatistics {
        let performance = self.estimator.statistics();
        let state = self.estimator.state();
        let (accuracy, mean_response_time_ms, mean_confidence) = performance
            .as_ref()
            .map(|p| (p.accuracy, p.mean_response_time_ms, p.mean_confidence))
            .unwrap_or_default();

        SessionStatistics {
            total_responses: state.responses,
            accuracy,
            ability: state.ability,
            standard_error: state.standard_error,
            skill_level: self.estimator.skill_level(),
            mean_response_time_ms,
            mean_confidence,
            performance,
            current_emotion: self.analyzer.current().cloned(),
            smoothed_affect: self.analyzer.smoothed(),
            emotional_trend: self.analyzer.trend_at(self.trend_horizon_ms, now_ms),
        }
    }

    pub fn reset(&mut self) {
        self.estimator.reset();
        self.analyzer.reset();
        info!("session reset");
    }
}

impl Default for SessionAdapter {
    fn default() -> Self {
        Self {
            extractor: FeatureExtractor::default(),
            analyzer: AffectAnalyzer::default(),
            estimator: AbilityEstimator::default(),
            checker: AnswerChecker::default(),
            trend_horizon_ms: DEFAULT_TREND_HORIZON_MS,
        }
    }
}
