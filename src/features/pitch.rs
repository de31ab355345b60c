use tracing::debug;

/// Autocorrelation pitch estimate restricted to `[min_hz, max_hz]`.
///
/// The lag with the largest unnormalised autocorrelation wins. Returns 0 Hz
/// (unvoiced) when no lag correlates positively or the winning frequency
/// falls outside the band.
pub(crate) fn estimate_pitch(samples: &[f64], sample_rate: u32, min_hz: f64, max_hz: f64) -> f64 {
    if sample_rate == 0 || samples.len() < 2 {
        return 0.0;
    }
    let rate = sample_rate as f64;
    let min_lag = ((rate / max_hz).floor() as usize).max(1);
    let max_lag = ((rate / min_hz).floor() as usize).min(samples.len() - 1);
    if min_lag > max_lag {
        debug!(
            sample_rate,
            len = samples.len(),
            "buffer too short for pitch search"
        );
        return 0.0;
    }

    let mut best_corr = 0.0;
    let mut best_lag = None;
    for lag in min_lag..=max_lag {
        let corr = autocorrelation(samples, lag);
        if corr > best_corr {
            best_corr = corr;
            best_lag = Some(lag);
        }
    }

    let Some(lag) = best_lag else {
        debug!("no positive autocorrelation; treating buffer as unvoiced");
        return 0.0;
    };
    let f0 = rate / lag as f64;
    if (min_hz..=max_hz).contains(&f0) {
        f0
    } else {
        0.0
    }
}

fn autocorrelation(samples: &[f64], lag: usize) -> f64 {
    samples
        .iter()
        .zip(samples[lag..].iter())
        .map(|(a, b)| a * b)
        .sum()
}
