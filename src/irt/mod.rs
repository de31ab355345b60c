//! Online ability estimation on a 3PL item response model.
//!
//! The estimator owns one learner's [`AbilityState`] and performance history.
//! Updates are a single gradient-style step per response followed by optional
//! emotion-driven nudges; the standard error shrinks as Fisher information
//! accumulates.

pub mod model;
mod stats;

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EstimatorConfig;
use crate::error::{AdaptError, Result};
use crate::types::{
    unix_millis, ItemDifficulty, PerformanceRecord, ResponseEvent, DEFAULT_RESPONSE_CONFIDENCE,
};

pub use stats::{PerformanceStatistics, PerformanceTrend, SkillLevel, TREND_WINDOW};

const FRUSTRATION_LIMIT: f64 = 0.7;
const FRUSTRATION_FACTOR: f64 = 0.95;
const CONFIDENT_LIMIT: f64 = 0.85;
const QUICK_RESPONSE_MS: u64 = 5_000;
const CONFIDENT_FACTOR: f64 = 1.05;
const DISENGAGED_LIMIT: f64 = 0.4;
const DISENGAGED_FACTOR: f64 = 0.97;

/// Initial standard error of a fresh or reset estimate.
pub const INITIAL_STANDARD_ERROR: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AbilityState {
    pub ability: f64,
    pub standard_error: f64,
    pub responses: usize,
}

/// Outcome of applying one response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbilityUpdate {
    pub question_id: String,
    /// Predicted probability of a correct answer before the update.
    pub probability: f64,
    pub information: f64,
    pub ability_before: f64,
    pub ability_after: f64,
    pub standard_error: f64,
}

pub struct AbilityEstimator {
    config: EstimatorConfig,
    ability: f64,
    standard_error: f64,
    history: Vec<PerformanceRecord>,
    rng: ChaCha8Rng,
}

impl AbilityEstimator {
    /// Builds an estimator after checking the configuration.
    pub fn new(config: EstimatorConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EstimatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            ability: config.initial_ability,
            standard_error: INITIAL_STANDARD_ERROR,
            history: Vec::new(),
            rng,
            config,
        }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn state(&self) -> AbilityState {
        AbilityState {
            ability: self.ability,
            standard_error: self.standard_error,
            responses: self.history.len(),
        }
    }

    pub fn ability(&self) -> f64 {
        self.ability
    }

    pub fn standard_error(&self) -> f64 {
        self.standard_error
    }

    pub fn history(&self) -> &[PerformanceRecord] {
        &self.history
    }

    pub fn predict_correct_probability(&self, ability: f64, item_difficulty: f64) -> f64 {
        model::probability(
            ability,
            item_difficulty,
            self.config.discrimination,
            self.config.guessing,
        )
    }

    /// Probability that the learner, at the current estimate, answers correctly.
    pub fn predicted_success_probability(&self, item_difficulty: f64) -> f64 {
        self.predict_correct_probability(self.ability, item_difficulty)
    }

    pub fn fisher_information(&self, ability: f64, item_difficulty: f64) -> f64 {
        model::information(
            ability,
            item_difficulty,
            self.config.discrimination,
            self.config.guessing,
        )
    }

    /// Applies one response to the estimate.
    ///
    /// Malformed events are logged and rejected without touching any state.
    pub fn update(&mut self, event: &ResponseEvent) -> Result<AbilityUpdate> {
        let is_correct = match self.validate_event(event) {
            Ok(is_correct) => is_correct,
            Err(err) => {
                warn!(question = %event.question_id, error = %err, "rejecting response event");
                return Err(err);
            }
        };
        let cfg = &self.config;
        let ability_before = self.ability;

        let p = self.predict_correct_probability(self.ability, event.item_difficulty);
        let information = model::information_at(p, cfg.discrimination, cfg.guessing);
        if information > 0.0 && information.is_finite() {
            self.standard_error =
                (1.0 / (1.0 / self.standard_error.powi(2) + information)).sqrt();
        } else {
            debug!(
                question = %event.question_id,
                information, "no usable information; standard error unchanged"
            );
        }

        let error = if is_correct { 1.0 - p } else { -p };
        self.ability = self.clamp(self.ability + cfg.learning_rate * error * cfg.discrimination);

        if cfg.emotion_weighting {
            if let Some(state) = &event.emotional_state {
                let mut factor = 1.0;
                if state.frustration > FRUSTRATION_LIMIT {
                    factor *= FRUSTRATION_FACTOR;
                }
                if state.confidence > CONFIDENT_LIMIT && event.response_time_ms < QUICK_RESPONSE_MS
                {
                    factor *= CONFIDENT_FACTOR;
                }
                if state.engagement < DISENGAGED_LIMIT {
                    factor *= DISENGAGED_FACTOR;
                }
                if factor != 1.0 {
                    debug!(factor, dominant = %state.dominant_emotion, "emotional adjustment");
                }
                self.ability = self.clamp(self.ability * factor);
            }
        }

        self.history.push(PerformanceRecord {
            question_id: event.question_id.clone(),
            is_correct,
            response_time_ms: event.response_time_ms,
            item_difficulty: event.item_difficulty,
            confidence: event.confidence.unwrap_or(DEFAULT_RESPONSE_CONFIDENCE),
            emotional_state: event.emotional_state.clone(),
            ability_after: self.ability,
            standard_error_after: self.standard_error,
            timestamp_ms: unix_millis(),
        });

        info!(
            question = %event.question_id,
            correct = is_correct,
            probability = p,
            ability = self.ability,
            standard_error = self.standard_error,
            "ability updated"
        );

        Ok(AbilityUpdate {
            question_id: event.question_id.clone(),
            probability: p,
            information,
            ability_before,
            ability_after: self.ability,
            standard_error: self.standard_error,
        })
    }

    /// Checks an event without applying it; returns its correctness flag.
    pub fn validate_event(&self, event: &ResponseEvent) -> Result<bool> {
        let is_correct = event
            .is_correct
            .ok_or_else(|| AdaptError::malformed(&event.question_id, "missing is_correct"))?;
        if !event.item_difficulty.is_finite() {
            return Err(AdaptError::malformed(
                &event.question_id,
                "item difficulty is not finite",
            ));
        }
        if let Some(confidence) = event.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(AdaptError::malformed(
                    &event.question_id,
                    format!("confidence {} outside [0, 1]", confidence),
                ));
            }
        }
        Ok(is_correct)
    }

    /// Current ability plus uniform jitter, clamped to the difficulty bounds.
    pub fn next_difficulty(&mut self) -> f64 {
        let jitter = self.config.jitter;
        let offset = if jitter > 0.0 {
            self.rng.gen_range(-jitter..=jitter)
        } else {
            0.0
        };
        self.clamp(self.ability + offset)
    }

    /// Greedily fills up to `length` slots with the items closest to a freshly
    /// jittered target difficulty. Each item is used at most once.
    pub fn build_personalized_path<T: ItemDifficulty>(
        &mut self,
        items: Vec<T>,
        length: usize,
    ) -> Result<Vec<T>> {
        if items.is_empty() {
            warn!(length, "cannot build a path from an empty item pool");
            return Err(AdaptError::EmptyItemPool);
        }
        let mut pool = items;
        let mut path = Vec::with_capacity(length.min(pool.len()));
        while path.len() < length && !pool.is_empty() {
            let target = self.next_difficulty();
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (index, item) in pool.iter().enumerate() {
                let distance = (item.difficulty() - target).abs();
                if distance < best_distance {
                    best = index;
                    best_distance = distance;
                }
            }
            path.push(pool.remove(best));
        }
        debug!(requested = length, built = path.len(), "personalized path built");
        Ok(path)
    }

    /// The item carrying the most Fisher information at the current estimate.
    ///
    /// Items already answered in this session are skipped until every item
    /// in the pool has been answered.
    pub fn select_most_informative<'a, T: ItemDifficulty>(&self, items: &'a [T]) -> Option<&'a T> {
        let answered: HashSet<&str> = self
            .history
            .iter()
            .map(|record| record.question_id.as_str())
            .collect();
        let unanswered: Vec<&T> = items
            .iter()
            .filter(|item| item.item_id().map_or(true, |id| !answered.contains(id)))
            .collect();
        let candidates: Vec<&T> = if unanswered.is_empty() {
            debug!(pool = items.len(), "every item answered; allowing repeats");
            items.iter().collect()
        } else {
            unanswered
        };

        let mut best: Option<(&T, f64)> = None;
        for item in candidates {
            let information = self.fisher_information(self.ability, item.difficulty());
            if !information.is_finite() {
                continue;
            }
            match best {
                Some((_, top)) if information <= top => {}
                _ => best = Some((item, information)),
            }
        }
        best.map(|(item, _)| item)
    }

    pub fn skill_level(&self) -> SkillLevel {
        SkillLevel::from_ability(self.ability)
    }

    /// `None` until at least one response has been applied.
    pub fn statistics(&self) -> Option<PerformanceStatistics> {
        PerformanceStatistics::summarize(&self.history, self.ability, self.standard_error)
    }

    pub fn reset(&mut self) {
        self.ability = self.config.initial_ability;
        self.standard_error = INITIAL_STANDARD_ERROR;
        self.history.clear();
        info!(ability = self.ability, "ability estimator reset");
    }

    fn clamp(&self, ability: f64) -> f64 {
        ability.clamp(self.config.min_difficulty, self.config.max_difficulty)
    }
}

impl Default for AbilityEstimator {
    fn default() -> Self {
        Self::from_valid_config(EstimatorConfig::default())
    }
}
