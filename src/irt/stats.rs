use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::types::PerformanceRecord;

/// Responses considered by the recent-performance trend.
pub const TREND_WINDOW: usize = 5;
/// Smoothing factor of the response-time moving average.
pub const RESPONSE_TIME_ALPHA: f64 = 0.3;

/// Ability bands reported to learners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SkillLevel {
    Beginner,
    #[serde(rename = "Early Intermediate")]
    EarlyIntermediate,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl SkillLevel {
    pub fn from_ability(ability: f64) -> Self {
        if ability < -2.0 {
            SkillLevel::Beginner
        } else if ability < -1.0 {
            SkillLevel::EarlyIntermediate
        } else if ability < 0.0 {
            SkillLevel::Intermediate
        } else if ability < 1.0 {
            SkillLevel::Advanced
        } else if ability < 2.0 {
            SkillLevel::Expert
        } else {
            SkillLevel::Master
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::EarlyIntermediate => "Early Intermediate",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Expert => "Expert",
            SkillLevel::Master => "Master",
        }
    }
}

impl Display for SkillLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction of accuracy over the last [`TREND_WINDOW`] responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTrend {
    Improving,
    Stable,
    Struggling,
    Neutral,
}

impl PerformanceTrend {
    pub fn from_history(history: &[PerformanceRecord]) -> Self {
        if history.len() < TREND_WINDOW {
            return PerformanceTrend::Neutral;
        }
        let recent = &history[history.len() - TREND_WINDOW..];
        let accuracy =
            recent.iter().filter(|r| r.is_correct).count() as f64 / TREND_WINDOW as f64;
        if accuracy > 0.75 {
            PerformanceTrend::Improving
        } else if accuracy < 0.5 {
            PerformanceTrend::Struggling
        } else {
            PerformanceTrend::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceStatistics {
    pub total_responses: usize,
    pub correct_responses: usize,
    pub accuracy: f64,
    pub ability: f64,
    pub standard_error: f64,
    pub skill_level: SkillLevel,
    pub mean_response_time_ms: f64,
    pub response_time_ema_ms: f64,
    pub mean_confidence: f64,
    pub trend: PerformanceTrend,
}

impl PerformanceStatistics {
    /// `None` when nothing has been recorded.
    pub fn summarize(
        history: &[PerformanceRecord],
        ability: f64,
        standard_error: f64,
    ) -> Option<Self> {
        let first = history.first()?;
        let n = history.len() as f64;
        let correct_responses = history.iter().filter(|r| r.is_correct).count();
        let response_time_ema_ms = history
            .iter()
            .skip(1)
            .fold(first.response_time_ms as f64, |ema, record| {
                RESPONSE_TIME_ALPHA * record.response_time_ms as f64
                    + (1.0 - RESPONSE_TIME_ALPHA) * ema
            });

        Some(Self {
            total_responses: history.len(),
            correct_responses,
            accuracy: correct_responses as f64 / n,
            ability,
            standard_error,
            skill_level: SkillLevel::from_ability(ability),
            mean_response_time_ms: history.iter().map(|r| r.response_time_ms as f64).sum::<f64>()
                / n,
            response_time_ema_ms,
            mean_confidence: history.iter().map(|r| r.confidence).sum::<f64>() / n,
            trend: PerformanceTrend::from_history(history),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(is_correct: bool, response_time_ms: u64) -> PerformanceRecord {
        PerformanceRecord {
            question_id: "q".into(),
            is_correct,
            response_time_ms,
            item_difficulty: 0.0,
            confidence: 0.5,
            emotional_state: None,
            ability_after: 0.0,
            standard_error_after: 1.0,
            timestamp_ms: 0,
        }
    }

    #[test]
    fn skill_bands_use_strict_upper_bounds() {
        assert_eq!(SkillLevel::from_ability(-2.5), SkillLevel::Beginner);
        assert_eq!(SkillLevel::from_ability(-2.0), SkillLevel::EarlyIntermediate);
        assert_eq!(SkillLevel::from_ability(-0.5), SkillLevel::Intermediate);
        assert_eq!(SkillLevel::from_ability(0.0), SkillLevel::Advanced);
        assert_eq!(SkillLevel::from_ability(1.99), SkillLevel::Expert);
        assert_eq!(SkillLevel::from_ability(2.0), SkillLevel::Master);
        assert_eq!(SkillLevel::EarlyIntermediate.to_string(), "Early Intermediate");
        assert_eq!(
            serde_json::to_value(SkillLevel::EarlyIntermediate).unwrap(),
            serde_json::json!("Early Intermediate")
        );
    }

    #[test]
    fn trend_needs_five_responses() {
        let history: Vec<_> = (0..4).map(|_| record(true, 1_000)).collect();
        assert_eq!(PerformanceTrend::from_history(&history), PerformanceTrend::Neutral);
    }

    #[test]
    fn trend_reads_only_the_latest_window() {
        let mut history: Vec<_> = (0..5).map(|_| record(false, 1_000)).collect();
        assert_eq!(PerformanceTrend::from_history(&history), PerformanceTrend::Struggling);
        history.extend((0..4).map(|_| record(true, 1_000)));
        // last five: 1 wrong, 4 right
        assert_eq!(PerformanceTrend::from_history(&history), PerformanceTrend::Improving);
        history.extend([record(false, 1_000), record(false, 1_000), record(true, 1_000)]);
        // last five: right, right, wrong, wrong, right

        assert_eq!(PerformanceTrend::from_history(&history), PerformanceTrend::Stable);
    }

    #[test]
    fn summary_tracks_means_and_ema() {
        assert!(PerformanceStatistics::summarize(&[], 0.0, 1.0).is_none());
        let history = vec![record(true, 1_000), record(false, 2_000)];
        let stats = PerformanceStatistics::summarize(&history, 0.4, 0.8).unwrap();
        assert_eq!(stats.total_responses, 2);
        assert!((stats.accuracy - 0.5).abs() < 1e-12);
        assert!((stats.mean_response_time_ms - 1_500.0).abs() < 1e-9);
        assert!((stats.response_time_ema_ms - 1_300.0).abs() < 1e-9);
        assert_eq!(stats.skill_level, SkillLevel::Advanced);
    }
}
