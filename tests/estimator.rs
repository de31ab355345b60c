use std::collections::HashSet;

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use voxadapt::config::EstimatorConfig;
use voxadapt::irt::PerformanceTrend;
use voxadapt::{AbilityEstimator, AdaptError, CandidateItem, ResponseEvent, SkillLevel};

fn estimator(seed: u64) -> AbilityEstimator {
    AbilityEstimator::new(EstimatorConfig::default().with_seed(seed)).unwrap()
}

#[test]
fn easy_correct_then_hard_misses_stay_in_bounds() {
    let mut estimator = estimator(1);
    estimator
        .update(&ResponseEvent::new("warmup", true, -2.0))
        .unwrap();
    let after_easy = estimator.ability();
    assert!(after_easy > 0.0 && after_easy <= 3.0);

    let mut previous = after_easy;
    for i in 0..5 {
        estimator
            .update(&ResponseEvent::new(format!("hard-{i}"), false, 2.5))
            .unwrap();
        let ability = estimator.ability();
        assert!(ability < previous || ability == -3.0);
        assert!(ability >= -3.0);
        previous = ability;
    }
    assert!(estimator.ability() < after_easy);
}

#[test]
fn long_streaks_pin_to_the_bounds() {
    let mut estimator = estimator(2);
    for i in 0..50 {
        estimator
            .update(&ResponseEvent::new(format!("q{i}"), true, 3.0))
            .unwrap();
    }
    assert_eq!(estimator.ability(), 3.0);
    assert_eq!(estimator.skill_level(), SkillLevel::Master);

    for i in 0..50 {
        estimator
            .update(&ResponseEvent::new(format!("m{i}"), false, -3.0))
            .unwrap();
    }
    assert_eq!(estimator.ability(), -3.0);
    assert_eq!(estimator.skill_level(), SkillLevel::Beginner);
}

#[test]
fn standard_error_shrinks_with_information() {
    let mut estimator = estimator(3);
    let mut previous = estimator.standard_error();
    for i in 0..10 {
        estimator
            .update(&ResponseEvent::new(format!("q{i}"), i % 2 == 0, 0.0))
            .unwrap();
        let se = estimator.standard_error();
        assert!(se > 0.0 && se <= previous);
        previous = se;
    }
    assert!(previous < 1.0);
}

#[test]
fn path_over_spread_pool_uses_distinct_items() {
    let mut estimator = estimator(4);
    let pool: Vec<CandidateItem> = [-2.0, -1.0, 0.0, 1.0, 2.0]
        .iter()
        .enumerate()
        .map(|(i, d)| CandidateItem::new(format!("item-{i}"), *d))
        .collect();
    let path = estimator.build_personalized_path(pool, 3).unwrap();
    assert_eq!(path.len(), 3);
    let ids: HashSet<&str> = path.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
    // at ability 0 the first pick is the matched item
    assert_eq!(path[0].difficulty, 0.0);
}

#[test]
fn path_stops_when_pool_runs_out() {
    let mut estimator = estimator(5);
    let pool = vec![CandidateItem::new("a", 0.0), CandidateItem::new("b", 1.0)];
    assert_eq!(estimator.build_personalized_path(pool, 10).unwrap().len(), 2);
    assert_eq!(
        estimator.build_personalized_path(Vec::<CandidateItem>::new(), 3),
        Err(AdaptError::EmptyItemPool)
    );
}

#[test]
fn seeded_estimators_agree() {
    let mut a = estimator(42);
    let mut b = estimator(42);
    let draws_a: Vec<f64> = (0..16).map(|_| a.next_difficulty()).collect();
    let draws_b: Vec<f64> = (0..16).map(|_| b.next_difficulty()).collect();
    assert_eq!(draws_a, draws_b);
}

#[test]
fn statistics_report_trend_and_reset_clears_them() {
    let mut estimator = estimator(6);
    assert!(estimator.statistics().is_none());
    for i in 0..5 {
        estimator
            .update(
                &ResponseEvent::new(format!("q{i}"), true, 0.0)
                    .with_response_time(1_000)
                    .with_confidence(0.8),
            )
            .unwrap();
    }
    let stats = estimator.statistics().unwrap();
    assert_eq!(stats.total_responses, 5);
    assert_abs_diff_eq!(stats.accuracy, 1.0);
    assert_abs_diff_eq!(stats.mean_confidence, 0.8, epsilon = 1e-12);
    assert_abs_diff_eq!(stats.response_time_ema_ms, 1_000.0, epsilon = 1e-9);
    assert_eq!(stats.trend, PerformanceTrend::Improving);

    estimator.reset();
    assert!(estimator.statistics().is_none());
    assert_eq!(estimator.ability(), 0.0);
    assert_eq!(estimator.standard_error(), 1.0);
    assert!(estimator.history().is_empty());
}

#[test]
fn inverted_difficulty_bounds_are_rejected_at_construction() {
    let config = EstimatorConfig {
        min_difficulty: 3.0,
        max_difficulty: -3.0,
        ..EstimatorConfig::default()
    };
    let err = AbilityEstimator::new(config).err().unwrap();
    assert!(err.to_string().contains("min_difficulty"));
}

#[test]
fn reset_returns_to_configured_initial_ability() {
    let config = EstimatorConfig {
        initial_ability: -1.5,
        ..EstimatorConfig::default()
    };
    let mut estimator = AbilityEstimator::new(config).unwrap();
    estimator.update(&ResponseEvent::new("q", true, 0.0)).unwrap();
    estimator.reset();
    assert_eq!(estimator.ability(), -1.5);
}

#[test]
fn predicted_success_tracks_current_ability() {
    let mut estimator = estimator(7);
    let before = estimator.predicted_success_probability(1.0);
    estimator.update(&ResponseEvent::new("q", true, 1.0)).unwrap();
    assert!(estimator.predicted_success_probability(1.0) > before);
}

proptest! {
    #[test]
    fn ability_stays_within_bounds(
        responses in prop::collection::vec((any::<bool>(), -3.0f64..=3.0, 0u64..20_000), 1..60),
        frustration in 0.0f64..=1.0,
    ) {
        let mut estimator = estimator(9);
        for (i, (correct, difficulty, time)) in responses.into_iter().enumerate() {
            let mut event = ResponseEvent::new(format!("q{i}"), correct, difficulty)
                .with_response_time(time);
            if i % 3 == 0 {
                event = event.with_emotional_state(
                    voxadapt::EmotionalState::from_dimensions(0.9, frustration, 0.2, 0),
                );
            }
            estimator.update(&event).unwrap();
            prop_assert!((-3.0..=3.0).contains(&estimator.ability()));
            prop_assert!(estimator.standard_error() > 0.0);
        }
    }

    #[test]
    fn probability_is_monotone(
        ability in -3.0f64..=3.0,
        difficulty in -3.0f64..=3.0,
        step in 0.0f64..=2.0,
    ) {
        let estimator = estimator(10);
        let p = estimator.predict_correct_probability(ability, difficulty);
        prop_assert!(estimator.predict_correct_probability(ability + step, difficulty) >= p);
        prop_assert!(estimator.predict_correct_probability(ability, difficulty + step) <= p);
        prop_assert!((0.1..=1.0).contains(&p));
    }

    #[test]
    fn next_difficulty_is_clamped(initial in -3.0f64..=3.0, seed in any::<u64>()) {
        let config = EstimatorConfig {
            initial_ability: initial,
            seed: Some(seed),
            ..EstimatorConfig::default()
        };
        let mut estimator = AbilityEstimator::new(config).unwrap();
        let next = estimator.next_difficulty();
        prop_assert!((-3.0..=3.0).contains(&next));
        prop_assert!((next - initial).abs() <= 0.25 + 1e-12);
    }
}
