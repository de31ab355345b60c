//! Acoustic feature extraction from a finished mono waveform.
//!
//! Extraction is a pure function of the buffer and the [`FeatureConfig`]
//! constants. Degenerate input (empty, silent, zero sample rate) never
//! errors: every ratio falls back to zero and pitch reports unvoiced.

mod cepstral;
mod energy;
mod pauses;
mod pitch;
mod spectral;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{FeatureConfig, TensionConfig};
use crate::types::AudioData;

pub use cepstral::{hz_to_mel, mel_to_hz};

/// Scalar and cepstral descriptors of one spoken response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub duration_secs: f64,
    pub rms: f64,
    pub energy_db: f64,
    pub zero_crossing_rate: f64,
    /// Fundamental frequency in Hz, 0 when unvoiced.
    pub pitch_hz: f64,
    pub spectral_centroid: f64,
    pub spectral_flux: f64,
    pub pause_count: usize,
    pub pause_ratio: f64,
    pub longest_pause_ms: f64,
    /// Weighted tension indicators, clamped to [0, 1].
    pub voice_tension: f64,
    /// Estimated words per minute.
    pub speech_rate: f64,
    pub cepstral: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an extractor after checking the configuration.
    pub fn with_config(config: FeatureConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn extract(&self, audio: &AudioData) -> FeatureVector {
        self.extract_samples(&audio.samples, audio.sample_rate)
    }

    pub fn extract_samples(&self, samples: &[f32], sample_rate: u32) -> FeatureVector {
        let config = &self.config;
        let signal: Vec<f64> = samples.iter().map(|&s| s as f64).collect();

        let rms = energy::rms(&signal);
        let energy_db = energy::to_decibels(rms);
        let zero_crossing_rate = energy::zero_crossing_rate(&signal);

        if signal.is_empty() || sample_rate == 0 {
            debug!(
                len = signal.len(),
                sample_rate, "degenerate audio buffer; returning neutral features"
            );
            return FeatureVector {
                rms,
                energy_db,
                zero_crossing_rate,
                cepstral: vec![0.0; config.cepstral_coefficients],
                ..FeatureVector::default()
            };
        }
        if rms <= energy::AMPLITUDE_FLOOR {
            debug!(len = signal.len(), "silent audio buffer");
        }

        let pitch_hz =
            pitch::estimate_pitch(&signal, sample_rate, config.pitch_min_hz, config.pitch_max_hz);
        let shape = spectral::spectral_shape(&signal, sample_rate, config.centroid_window);
        let pauses = pauses::detect_pauses(
            &signal,
            sample_rate,
            config.pause_window_ms,
            config.pause_threshold_ratio,
        );
        let speech_rate =
            pauses::estimate_speech_rate(&signal, sample_rate, config.speech_rate_window_ms);
        let cepstral = cepstral::cepstral_coefficients(&signal, sample_rate, config);
        let voice_tension = voice_tension(
            &config.tension,
            pitch_hz,
            energy_db,
            shape.centroid,
            zero_crossing_rate,
        );

        FeatureVector {
            duration_secs: signal.len() as f64 / sample_rate as f64,
            rms,
            energy_db,
            zero_crossing_rate,
            pitch_hz,
            spectral_centroid: shape.centroid,
            spectral_flux: shape.flux,
            pause_count: pauses.count,
            pause_ratio: pauses.ratio,
            longest_pause_ms: pauses.longest_ms,
            voice_tension,
            speech_rate,
            cepstral,
        }
    }
}

/// Sum of the fixed-weight tension indicators, clamped to [0, 1].
pub fn voice_tension(
    config: &TensionConfig,
    pitch_hz: f64,
    energy_db: f64,
    spectral_centroid: f64,
    zero_crossing_rate: f64,
) -> f64 {
    let indicators = [
        (pitch_hz > config.pitch_ceiling_hz, config.pitch_weight),
        (energy_db > config.energy_ceiling_db, config.energy_weight),
        (
            spectral_centroid > config.centroid_ceiling_hz,
            config.centroid_weight,
        ),
        (zero_crossing_rate < config.zcr_floor, config.zcr_weight),
    ];
    indicators
        .iter()
        .filter(|(active, _)| *active)
        .map(|(_, weight)| weight)
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tension_sums_active_indicators() {
        let config = TensionConfig::default();
        assert_eq!(voice_tension(&config, 0.0, -60.0, 0.0, 0.5), 0.0);
        let all = voice_tension(&config, 300.0, -10.0, 3_000.0, 0.05);
        assert!((all - 1.0).abs() < 1e-12);
        let pitch_and_zcr = voice_tension(&config, 300.0, -60.0, 0.0, 0.05);
        assert!((pitch_and_zcr - 0.5).abs() < 1e-12);
    }

    #[test]
    fn tension_is_clamped_with_heavy_weights() {
        let config = TensionConfig {
            pitch_weight: 0.9,
            energy_weight: 0.9,
            ..TensionConfig::default()
        };
        assert_eq!(voice_tension(&config, 300.0, 0.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn zero_sample_rate_is_neutral() {
        let features = FeatureExtractor::new().extract_samples(&[0.3; 400], 0);
        assert_eq!(features.pitch_hz, 0.0);
        assert_eq!(features.pause_ratio, 0.0);
        assert_eq!(features.speech_rate, 0.0);
        assert_eq!(features.cepstral.len(), 13);
    }
}
