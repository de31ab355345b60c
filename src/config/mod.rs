use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Complete tuning surface for one learner session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub features: FeatureConfig,
    pub affect: AffectConfig,
    pub estimator: EstimatorConfig,
}

impl AppConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        let config = Self::from_json(&raw)
            .with_context(|| format!("failed to load config from {:?}", path))?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(raw).context("failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.features.validate()?;
        self.affect.validate()?;
        self.estimator.validate()?;
        Ok(())
    }
}

/// Constants used by the acoustic feature extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    #[serde(alias = "cepstralCoefficients", alias = "mfcc")]
    pub cepstral_coefficients: usize,
    #[serde(alias = "melBands")]
    pub mel_bands: usize,
    #[serde(alias = "preEmphasis")]
    pub pre_emphasis: f32,
    #[serde(alias = "frameMs")]
    pub frame_ms: f64,
    #[serde(alias = "hopMs")]
    pub hop_ms: f64,
    #[serde(alias = "pauseWindowMs")]
    pub pause_window_ms: f64,
    #[serde(alias = "pauseThresholdRatio")]
    pub pause_threshold_ratio: f64,
    #[serde(alias = "speechRateWindowMs")]
    pub speech_rate_window_ms: f64,
    #[serde(alias = "centroidWindow")]
    pub centroid_window: usize,
    #[serde(alias = "pitchMinHz")]
    pub pitch_min_hz: f64,
    #[serde(alias = "pitchMaxHz")]
    pub pitch_max_hz: f64,
    pub tension: TensionConfig,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            cepstral_coefficients: 13,
            mel_bands: 26,
            pre_emphasis: 0.97,
            frame_ms: 25.0,
            hop_ms: 10.0,
            pause_window_ms: 100.0,
            pause_threshold_ratio: 0.2,
            speech_rate_window_ms: 50.0,
            centroid_window: 512,
            pitch_min_hz: 80.0,
            pitch_max_hz: 400.0,
            tension: TensionConfig::default(),
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.cepstral_coefficients > 0,
            "cepstral_coefficients must be greater than zero"
        );
        ensure!(
            self.cepstral_coefficients <= self.mel_bands,
            "cepstral_coefficients ({}) cannot exceed mel_bands ({})",
            self.cepstral_coefficients,
            self.mel_bands
        );
        ensure!(
            (0.0..1.0).contains(&self.pre_emphasis),
            "pre_emphasis must lie in [0, 1)"
        );
        ensure!(
            self.frame_ms > 0.0 && self.hop_ms > 0.0,
            "frame_ms and hop_ms must be positive"
        );
        ensure!(self.pause_window_ms > 0.0, "pause_window_ms must be positive");
        ensure!(
            self.speech_rate_window_ms > 0.0,
            "speech_rate_window_ms must be positive"
        );
        ensure!(
            self.pause_threshold_ratio > 0.0 && self.pause_threshold_ratio <= 1.0,
            "pause_threshold_ratio must lie in (0, 1]"
        );
        ensure!(self.centroid_window >= 2, "centroid_window must be at least 2");
        ensure!(
            self.pitch_min_hz > 0.0 && self.pitch_min_hz < self.pitch_max_hz,
            "pitch band must satisfy 0 < pitch_min_hz < pitch_max_hz"
        );
        Ok(())
    }
}

/// Indicators summed into the voice-tension index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TensionConfig {
    #[serde(alias = "pitchCeilingHz")]
    pub pitch_ceiling_hz: f64,
    #[serde(alias = "energyCeilingDb")]
    pub energy_ceiling_db: f64,
    #[serde(alias = "centroidCeilingHz")]
    pub centroid_ceiling_hz: f64,
    #[serde(alias = "zcrFloor")]
    pub zcr_floor: f64,
    #[serde(alias = "pitchWeight")]
    pub pitch_weight: f64,
    #[serde(alias = "energyWeight")]
    pub energy_weight: f64,
    #[serde(alias = "centroidWeight")]
    pub centroid_weight: f64,
    #[serde(alias = "zcrWeight")]
    pub zcr_weight: f64,
}

impl Default for TensionConfig {
    fn default() -> Self {
        Self {
            pitch_ceiling_hz: 250.0,
            energy_ceiling_db: -20.0,
            centroid_ceiling_hz: 2500.0,
            zcr_floor: 0.15,
            pitch_weight: 0.3,
            energy_weight: 0.3,
            centroid_weight: 0.2,
            zcr_weight: 0.2,
        }
    }
}

/// Thresholds for the heuristic affect scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AffectConfig {
    #[serde(alias = "smoothingWindow")]
    pub smoothing_window: usize,
    #[serde(alias = "pitchCeilingHz")]
    pub pitch_ceiling_hz: f64,
    /// Speech rate above which a response counts as fluent.
    #[serde(alias = "fluentSpeechRate")]
    pub fluent_speech_rate: f64,
    /// Energy above which a response counts as clearly voiced.
    #[serde(alias = "audibleEnergyDb")]
    pub audible_energy_db: f64,
    #[serde(alias = "agitatedEnergyDb")]
    pub agitated_energy_db: f64,
    #[serde(alias = "rushedSpeechRate")]
    pub rushed_speech_rate: f64,
    #[serde(alias = "centroidBandHz")]
    pub centroid_band_hz: (f64, f64),
    #[serde(alias = "energyBandDb")]
    pub energy_band_db: (f64, f64),
    #[serde(alias = "speechRateBand")]
    pub speech_rate_band: (f64, f64),
    #[serde(alias = "trendDeadBand")]
    pub trend_dead_band: f64,
}

impl Default for AffectConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 3,
            pitch_ceiling_hz: 250.0,
            fluent_speech_rate: 100.0,
            audible_energy_db: -40.0,
            agitated_energy_db: -25.0,
            rushed_speech_rate: 200.0,
            centroid_band_hz: (1500.0, 3500.0),
            energy_band_db: (-45.0, -15.0),
            speech_rate_band: (100.0, 250.0),
            trend_dead_band: 0.1,
        }
    }
}

impl AffectConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.smoothing_window >= 1,
            "smoothing_window must be at least 1"
        );
        ensure!(
            self.trend_dead_band >= 0.0,
            "trend_dead_band must be non-negative"
        );
        for (label, (low, high)) in [
            ("centroid_band_hz", self.centroid_band_hz),
            ("energy_band_db", self.energy_band_db),
            ("speech_rate_band", self.speech_rate_band),
        ] {
            ensure!(low < high, "{} must be an increasing pair", label);
        }
        Ok(())
    }
}

/// Parameters of the 3PL ability estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    #[serde(alias = "initialAbility", alias = "abilityInitial")]
    pub initial_ability: f64,
    #[serde(alias = "minDifficulty")]
    pub min_difficulty: f64,
    #[serde(alias = "maxDifficulty")]
    pub max_difficulty: f64,
    pub discrimination: f64,
    #[serde(alias = "guessingParameter")]
    pub guessing: f64,
    #[serde(alias = "learningRate")]
    pub learning_rate: f64,
    #[serde(alias = "emotionWeighting")]
    pub emotion_weighting: bool,
    /// Half-width of the uniform jitter added to proposed difficulties.
    pub jitter: f64,
    /// Fixed seed for reproducible difficulty jitter.
    pub seed: Option<u64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            initial_ability: 0.0,
            min_difficulty: -3.0,
            max_difficulty: 3.0,
            discrimination: 1.2,
            guessing: 0.1,
            learning_rate: 0.3,
            emotion_weighting: true,
            jitter: 0.25,
            seed: None,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_difficulty < self.max_difficulty,
            "min_difficulty ({}) must be below max_difficulty ({})",
            self.min_difficulty,
            self.max_difficulty
        );
        ensure!(
            (self.min_difficulty..=self.max_difficulty).contains(&self.initial_ability),
            "initial_ability ({}) must lie within the difficulty bounds",
            self.initial_ability
        );
        ensure!(self.discrimination > 0.0, "discrimination must be positive");
        ensure!(
            (0.0..1.0).contains(&self.guessing),
            "guessing must lie in [0, 1)"
        );
        ensure!(self.learning_rate > 0.0, "learning_rate must be positive");
        ensure!(self.jitter >= 0.0, "jitter must be non-negative");
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
