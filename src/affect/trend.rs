use std::collections::HashMap;

use serde::Serialize;

use super::{Emotion, EmotionalState};

/// Direction of mean confidence across a trend window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmotionFrequency {
    pub emotion: Emotion,
    pub count: usize,
}

/// Aggregate of the emotional history over a time horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionalTrend {
    pub horizon_ms: u64,
    pub samples: usize,
    pub avg_confidence: f64,
    pub avg_frustration: f64,
    pub avg_engagement: f64,
    /// At most three labels, most frequent first.
    pub dominant_emotions: Vec<EmotionFrequency>,
    pub direction: TrendDirection,
}

impl EmotionalTrend {
    pub(crate) fn from_states(
        horizon_ms: u64,
        states: &[&EmotionalState],
        dead_band: f64,
    ) -> Option<Self> {
        if states.is_empty() {
            return None;
        }
        let n = states.len() as f64;
        let avg_confidence = states.iter().map(|s| s.confidence).sum::<f64>() / n;
        let avg_frustration = states.iter().map(|s| s.frustration).sum::<f64>() / n;
        let avg_engagement = states.iter().map(|s| s.engagement).sum::<f64>() / n;

        Some(Self {
            horizon_ms,
            samples: states.len(),
            avg_confidence,
            avg_frustration,
            avg_engagement,
            dominant_emotions: rank_emotions(states),
            direction: direction(states, dead_band),
        })
    }
}

fn rank_emotions(states: &[&EmotionalState]) -> Vec<EmotionFrequency> {
    let mut counts: HashMap<Emotion, usize> = HashMap::new();
    for state in states {
        *counts.entry(state.dominant_emotion).or_default() += 1;
    }
    let mut ranked: Vec<EmotionFrequency> = counts
        .into_iter()
        .map(|(emotion, count)| EmotionFrequency { emotion, count })
        .collect();
    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.emotion.rank().cmp(&b.emotion.rank()))
    });
    ranked.truncate(3);
    ranked
}

fn direction(states: &[&EmotionalState], dead_band: f64) -> TrendDirection {
    if states.len() < 2 {
        return TrendDirection::Stable;
    }
    let (first, second) = states.split_at(states.len() / 2);
    let mean = |half: &[&EmotionalState]| {
        half.iter().map(|s| s.confidence).sum::<f64>() / half.len() as f64
    };
    let delta = mean(second) - mean(first);
    if delta > dead_band {
        TrendDirection::Improving
    } else if delta < -dead_band {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}
