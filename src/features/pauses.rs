use super::cepstral::samples_for_ms;
use super::energy::{rms, AMPLITUDE_FLOOR};

/// Upper bound on the speech-rate estimate, in words per minute.
const MAX_SPEECH_RATE: f64 = 300.0;
const SYLLABLES_PER_PEAK: f64 = 0.5;
const SYLLABLES_PER_WORD: f64 = 4.0;

/// Hesitation markers found by a fixed-window energy scan.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct PauseStats {
    pub count: usize,
    pub ratio: f64,
    pub longest_ms: f64,
}

/// Scan consecutive windows of `window_ms` and count those whose RMS falls
/// below `threshold_ratio` of the whole-buffer RMS.
///
/// Windows cover the full buffer, the trailing partial window included, so a
/// fully silent buffer reports a ratio of exactly 1.
pub(crate) fn detect_pauses(
    samples: &[f64],
    sample_rate: u32,
    window_ms: f64,
    threshold_ratio: f64,
) -> PauseStats {
    if samples.is_empty() || sample_rate == 0 {
        return PauseStats::default();
    }
    let window = samples_for_ms(sample_rate, window_ms);
    let threshold = rms(samples) * threshold_ratio;

    let mut total_windows = 0usize;
    let mut count = 0usize;
    let mut run_samples = 0usize;
    let mut longest_samples = 0usize;
    for chunk in samples.chunks(window) {
        total_windows += 1;
        let energy = rms(chunk);
        if energy < threshold || energy <= AMPLITUDE_FLOOR {
            count += 1;
            run_samples += chunk.len();
            longest_samples = longest_samples.max(run_samples);
        } else {
            run_samples = 0;
        }
    }

    PauseStats {
        count,
        ratio: count as f64 / total_windows as f64,
        longest_ms: longest_samples as f64 * 1000.0 / sample_rate as f64,
    }
}

/// Rough words-per-minute estimate from windows that carry above-average energy.
pub(crate) fn estimate_speech_rate(samples: &[f64], sample_rate: u32, window_ms: f64) -> f64 {
    if samples.is_empty() || sample_rate == 0 {
        return 0.0;
    }
    let window = samples_for_ms(sample_rate, window_ms);
    let threshold = rms(samples) * 0.5;
    let peaks = samples
        .chunks_exact(window)
        .filter(|chunk| rms(chunk) > threshold)
        .count();
    let duration_secs = samples.len() as f64 / sample_rate as f64;
    let words = peaks as f64 * SYLLABLES_PER_PEAK / SYLLABLES_PER_WORD;
    (words / duration_secs * 60.0).clamp(0.0, MAX_SPEECH_RATE)
}
