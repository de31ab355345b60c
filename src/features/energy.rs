/// Floor applied before converting amplitudes to decibels.
pub(crate) const AMPLITUDE_FLOOR: f64 = 1e-10;

pub(crate) fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f64).sqrt()
}

pub(crate) fn to_decibels(rms: f64) -> f64 {
    20.0 * rms.max(AMPLITUDE_FLOOR).log10()
}

/// Fraction of adjacent sample pairs whose sign differs; zero counts as positive.
pub(crate) fn zero_crossing_rate(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|pair| (pair[0] < 0.0) != (pair[1] < 0.0))
        .count();
    crossings as f64 / (samples.len() - 1) as f64
}
