use std::f64::consts::PI;
use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};
use tracing::debug;

/// Windowed real FFT producing magnitude spectra for fixed-length frames.
pub(crate) struct SpectrumAnalyzer {
    fft: Arc<dyn RealToComplex<f64>>,
    window: Vec<f64>,
    fft_size: usize,
}

impl SpectrumAnalyzer {
    /// Hamming-windowed analyzer for frames of `frame_len` samples, zero-padded
    /// to `fft_size`.
    pub(crate) fn hamming(frame_len: usize, fft_size: usize) -> Self {
        let fft_size = fft_size.max(frame_len).max(2);
        let mut planner = RealFftPlanner::<f64>::new();
        Self {
            fft: planner.plan_fft_forward(fft_size),
            window: hamming_window(frame_len),
            fft_size,
        }
    }

    pub(crate) fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub(crate) fn bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Magnitude spectrum of `frame`; samples beyond the window length are ignored.
    pub(crate) fn magnitudes(&self, frame: &[f64]) -> Vec<f64> {
        let mut input = self.fft.make_input_vec();
        for ((slot, sample), weight) in input.iter_mut().zip(frame).zip(&self.window) {
            *slot = sample * weight;
        }
        let mut output = self.fft.make_output_vec();
        if let Err(err) = self.fft.process(&mut input, &mut output) {
            debug!(error = %err, "FFT failed; substituting an empty spectrum");
            return vec![0.0; self.bins()];
        }
        output.iter().map(|bin| bin.norm()).collect()
    }

    pub(crate) fn bin_frequency(&self, bin: usize, sample_rate: u32) -> f64 {
        bin as f64 * sample_rate as f64 / self.fft_size as f64
    }
}

pub(crate) fn hamming_window(len: usize) -> Vec<f64> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f64;
    (0..len)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos())
        .collect()
}

/// Per-buffer spectral shape statistics.
pub(crate) struct SpectralShape {
    pub centroid: f64,
    pub flux: f64,
}

/// Mean spectral centroid and spectral flux over non-overlapping windows.
///
/// A buffer shorter than one window is analysed as a single zero-padded frame.
/// Windows under two samples carry no spectrum and yield zeros.
pub(crate) fn spectral_shape(samples: &[f64], sample_rate: u32, window: usize) -> SpectralShape {
    if samples.is_empty() || sample_rate == 0 || window < 2 {
        return SpectralShape {
            centroid: 0.0,
            flux: 0.0,
        };
    }
    let analyzer = SpectrumAnalyzer::hamming(window, window);
    let frames: Vec<&[f64]> = if samples.len() < window {
        vec![samples]
    } else {
        samples.chunks_exact(window).collect()
    };
    let spectra: Vec<Vec<f64>> = frames
        .iter()
        .map(|frame| analyzer.magnitudes(frame))
        .collect();

    let centroids: Vec<f64> = spectra
        .iter()
        .filter_map(|spectrum| centroid(spectrum, &analyzer, sample_rate))
        .collect();
    let centroid = if centroids.is_empty() {
        0.0
    } else {
        centroids.iter().sum::<f64>() / centroids.len() as f64
    };

    SpectralShape {
        centroid,
        flux: mean_flux(&spectra),
    }
}

fn centroid(spectrum: &[f64], analyzer: &SpectrumAnalyzer, sample_rate: u32) -> Option<f64> {
    let total: f64 = spectrum.iter().sum();
    if total <= f64::EPSILON {
        return None;
    }
    let weighted: f64 = spectrum
        .iter()
        .enumerate()
        .map(|(bin, magnitude)| analyzer.bin_frequency(bin, sample_rate) * magnitude)
        .sum();
    Some(weighted / total)
}

fn mean_flux(spectra: &[Vec<f64>]) -> f64 {
    if spectra.len() < 2 {
        return 0.0;
    }
    let total: f64 = spectra
        .windows(2)
        .map(|pair| {
            pair[1]
                .iter()
                .zip(pair[0].iter())
                .map(|(curr, prev)| (curr - prev).max(0.0).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .sum();
    total / (spectra.len() - 1) as f64
}
