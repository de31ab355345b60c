use std::f64::consts::PI;

use ndarray::{Array1, Array2};

use super::energy::AMPLITUDE_FLOOR;
use super::spectral::SpectrumAnalyzer;
use crate::config::FeatureConfig;

/// Frame-averaged mel-frequency cepstral coefficients.
///
/// Pre-emphasis, 25 ms Hamming frames on a 10 ms hop, power spectrum, mel
/// filterbank, natural log, DCT-II truncated to the configured count. Buffers
/// shorter than one frame yield an all-zero vector.
pub(crate) fn cepstral_coefficients(
    samples: &[f64],
    sample_rate: u32,
    config: &FeatureConfig,
) -> Vec<f64> {
    let count = config.cepstral_coefficients;
    if sample_rate == 0 || samples.is_empty() {
        return vec![0.0; count];
    }
    let emphasized = pre_emphasis(samples, config.pre_emphasis as f64);
    let frame_len = samples_for_ms(sample_rate, config.frame_ms);
    let hop = samples_for_ms(sample_rate, config.hop_ms);
    if emphasized.len() < frame_len {
        return vec![0.0; count];
    }

    let analyzer = SpectrumAnalyzer::hamming(frame_len, frame_len.next_power_of_two());
    let filterbank = mel_filterbank(
        sample_rate,
        analyzer.fft_size(),
        config.mel_bands,
        0.0,
        sample_rate as f64 / 2.0,
    );
    let scale = analyzer.fft_size() as f64;

    let mut total = Array1::<f64>::zeros(count);
    let mut frames = 0usize;
    for start in (0..=emphasized.len() - frame_len).step_by(hop) {
        let frame = &emphasized[start..start + frame_len];
        let power = Array1::from_iter(
            analyzer
                .magnitudes(frame)
                .into_iter()
                .map(|m| m * m / scale),
        );
        let log_mel = filterbank.dot(&power).mapv(|energy| energy.max(AMPLITUDE_FLOOR).ln());
        total += &dct_ii(&log_mel, count);
        frames += 1;
    }
    (total / frames as f64).to_vec()
}

pub(crate) fn pre_emphasis(samples: &[f64], coefficient: f64) -> Vec<f64> {
    let mut emphasized = Vec::with_capacity(samples.len());
    if let Some(&first) = samples.first() {
        emphasized.push(first);
    }
    emphasized.extend(
        samples
            .windows(2)
            .map(|pair| pair[1] - coefficient * pair[0]),
    );
    emphasized
}

pub(crate) fn samples_for_ms(sample_rate: u32, ms: f64) -> usize {
    ((sample_rate as f64 * ms / 1000.0).floor() as usize).max(1)
}

pub fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank, shape `(n_mels, n_fft / 2 + 1)`.
pub(crate) fn mel_filterbank(
    sample_rate: u32,
    n_fft: usize,
    n_mels: usize,
    fmin: f64,
    fmax: f64,
) -> Array2<f64> {
    let n_freqs = n_fft / 2 + 1;
    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);
    let bin_points: Vec<usize> = (0..=n_mels + 1)
        .map(|i| mel_min + (mel_max - mel_min) * i as f64 / (n_mels + 1) as f64)
        .map(|mel| ((n_fft as f64 + 1.0) * mel_to_hz(mel) / sample_rate as f64).floor() as usize)
        .collect();

    let mut filters = Array2::zeros((n_mels, n_freqs));
    for m in 0..n_mels {
        let (left, center, right) = (bin_points[m], bin_points[m + 1], bin_points[m + 2]);
        for k in left..center.min(n_freqs) {
            filters[[m, k]] = (k - left) as f64 / (center - left).max(1) as f64;
        }
        for k in center..right.min(n_freqs) {
            filters[[m, k]] = (right - k) as f64 / (right - center).max(1) as f64;
        }
    }
    filters
}

/// Unnormalised DCT-II, keeping the first `count` coefficients.
pub(crate) fn dct_ii(input: &Array1<f64>, count: usize) -> Array1<f64> {
    let n = input.len();
    if n == 0 {
        return Array1::zeros(count);
    }
    Array1::from_iter((0..count).map(|k| {
        input
            .iter()
            .enumerate()
            .map(|(i, x)| x * (PI / n as f64 * (i as f64 + 0.5) * k as f64).cos())
            .sum::<f64>()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pre_emphasis_keeps_first_sample() {
        let out = pre_emphasis(&[1.0, 1.0, 0.0], 0.97);
        assert_eq!(out.len(), 3);
        assert_abs_diff_eq!(out[0], 1.0);
        assert_abs_diff_eq!(out[1], 0.03, epsilon = 1e-12);
        assert_abs_diff_eq!(out[2], -0.97, epsilon = 1e-12);
        assert!(pre_emphasis(&[], 0.97).is_empty());
    }

    #[test]
    fn mel_scale_round_trips() {
        for hz in [0.0, 440.0, 1_000.0, 7_999.0] {
            assert_abs_diff_eq!(mel_to_hz(hz_to_mel(hz)), hz, epsilon = 1e-6);
        }
    }

    #[test]
    fn filterbank_rows_are_triangles_within_unit_height() {
        let bank = mel_filterbank(16_000, 512, 26, 0.0, 8_000.0);
        assert_eq!(bank.dim(), (26, 257));
        assert!(bank.iter().all(|w| (0.0..=1.0).contains(w)));
        assert!(bank.rows().into_iter().all(|row| row.sum() > 0.0));
    }

    #[test]
    fn dct_of_constant_only_has_dc_term() {
        let coeffs = dct_ii(&Array1::from_elem(8, 2.0), 4);
        assert_abs_diff_eq!(coeffs[0], 16.0, epsilon = 1e-9);
        for k in 1..4 {
            assert_abs_diff_eq!(coeffs[k], 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn short_buffer_yields_zero_vector() {
        let config = FeatureConfig::default();
        let coeffs = cepstral_coefficients(&[0.1; 100], 16_000, &config);
        assert_eq!(coeffs, vec![0.0; 13]);
    }

    #[test]
    fn coefficients_are_finite_for_silence() {
        let config = FeatureConfig::default();
        let coeffs = cepstral_coefficients(&[0.0; 4_000], 16_000, &config);
        assert_eq!(coeffs.len(), 13);
        assert!(coeffs.iter().all(|c| c.is_finite()));
        assert!(coeffs[0] < 0.0);
    }
}
