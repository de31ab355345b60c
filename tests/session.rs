use anyhow::Result;
use voxadapt::config::AppConfig;
use voxadapt::session::DEFAULT_TREND_HORIZON_MS;
use voxadapt::{AudioData, CandidateItem, ResponseEvent, SessionAdapter, SkillLevel, TrendDirection};

const SAMPLE_RATE: u32 = 16_000;

fn session(seed: u64) -> SessionAdapter {
    let mut config = AppConfig::default();
    config.estimator.seed = Some(seed);
    SessionAdapter::new(config).unwrap()
}

#[test]
fn mixed_session_aggregates_both_subsystems() -> Result<()> {
    let mut session = session(3);
    let speech = voiced(0.8);
    let hesitant = AudioData::new(vec![0.0; SAMPLE_RATE as usize], SAMPLE_RATE);

    session.record_response_at(
        ResponseEvent::new("q1", true, 0.0)
            .with_response_time(2_000)
            .with_confidence(0.9),
        Some(&hesitant),
        10_000,
    )?;
    session.record_response_at(
        ResponseEvent::new("q2", false, 1.0).with_response_time(4_000),
        None,
        11_000,
    )?;
    session.record_response_at(
        ResponseEvent::new("q3", true, 0.5).with_response_time(3_000),
        Some(&speech),
        12_000,
    )?;

    let stats = session.statistics_at(12_500);
    assert_eq!(stats.total_responses, 3);
    assert!((stats.accuracy - 2.0 / 3.0).abs() < 1e-12);
    assert!((stats.mean_response_time_ms - 3_000.0).abs() < 1e-9);
    assert!((stats.mean_confidence - (0.9 + 0.5 + 0.5) / 3.0).abs() < 1e-12);
    assert!(stats.standard_error < 1.0);

    let trend = stats.emotional_trend.expect("two analysed clips");
    assert_eq!(trend.samples, 2);
    assert_eq!(trend.direction, TrendDirection::Improving);
    assert_eq!(stats.smoothed_affect.map(|s| s.samples), Some(2));
    assert_eq!(
        stats.current_emotion.map(|e| e.timestamp_ms),
        Some(12_000)
    );
    Ok(())
}

#[test]
fn trend_horizon_is_configurable() -> Result<()> {
    let mut session = session(4).with_trend_horizon(1_000);
    session.record_response_at(ResponseEvent::new("q1", true, 0.0), Some(&voiced(0.3)), 1_000)?;
    assert!(session.statistics_at(1_000 + DEFAULT_TREND_HORIZON_MS).emotional_trend.is_none());
    assert!(session.statistics_at(1_500).emotional_trend.is_some());
    Ok(())
}

#[test]
fn reset_clears_ability_and_affect() -> Result<()> {
    let mut session = session(5);
    session.record_response_at(ResponseEvent::new("q1", true, 2.0), Some(&voiced(0.3)), 100)?;
    session.reset();

    let stats = session.statistics_at(200);
    assert_eq!(stats.total_responses, 0);
    assert_eq!(stats.ability, 0.0);
    assert_eq!(stats.standard_error, 1.0);
    assert_eq!(stats.skill_level, SkillLevel::Advanced);
    assert!(stats.current_emotion.is_none());
    assert!(stats.emotional_trend.is_none());
    Ok(())
}

#[test]
fn next_difficulty_and_path_follow_the_estimate() -> Result<()> {
    let mut session = session(6);
    for i in 0..15 {
        session.record_response(ResponseEvent::new(format!("q{i}"), true, 3.0), None)?;
    }
    let next = session.next_difficulty();
    assert!(next > 2.0 && next <= 3.0);

    let items = (-3..=3)
        .map(|d| CandidateItem::new(format!("d{d}"), d as f64))
        .collect();
    let path = session.build_personalized_path(items, 2)?;
    assert!(path.iter().all(|item| item.difficulty >= 2.0));
    Ok(())
}

#[test]
fn invalid_configuration_is_rejected_before_any_response() {
    let mut config = AppConfig::default();
    config.features.centroid_window = 0;
    assert!(SessionAdapter::new(config).is_err());

    let mut config = AppConfig::default();
    config.estimator.min_difficulty = 3.0;
    config.estimator.max_difficulty = -3.0;
    assert!(SessionAdapter::new(config).is_err());
}

#[test]
fn default_session_analyses_audio() -> Result<()> {
    let mut session = SessionAdapter::default();
    let audio = AudioData::new(vec![0.1; 4_000], SAMPLE_RATE);
    let outcome = session.record_response(ResponseEvent::new("q1", true, 0.0), Some(&audio))?;
    assert!(outcome.features.is_some());
    Ok(())
}

fn voiced(seconds: f32) -> AudioData {
    let len = (SAMPLE_RATE as f32 * seconds) as usize;
    let samples = (0..len)
        .map(|i| 0.3 * (2.0 * std::f32::consts::PI * 180.0 * i as f32 / SAMPLE_RATE as f32).sin())
        .collect();
    AudioData::new(samples, SAMPLE_RATE)
}
