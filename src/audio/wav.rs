use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::types::AudioData;

/// Decode a WAV file to mono f32 samples in [-1.0, 1.0].
///
/// Multi-channel files are mixed down by averaging each frame.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<AudioData> {
    let path = path.as_ref();
    let reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
    let audio = decode(reader).with_context(|| format!("Failed to decode {}", path.display()))?;
    debug!(
        path = %path.display(),
        samples = audio.samples.len(),
        sample_rate = audio.sample_rate,
        "decoded WAV"
    );
    Ok(audio)
}

fn decode<R: Read>(reader: WavReader<R>) -> Result<AudioData> {
    let spec = reader.spec();
    if spec.channels == 0 {
        bail!("WAV header declares zero channels");
    }
    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .context("Failed to read float samples")?,
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 * scale))
                .collect::<std::result::Result<_, _>>()
                .context("Failed to read integer samples")?
        }
    };
    Ok(AudioData::new(
        mix_to_mono(&interleaved, spec.channels as usize),
        spec.sample_rate,
    ))
}

fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Write mono audio as 16-bit PCM.
pub fn write_wav<P: AsRef<Path>>(audio: &AudioData, path: P) -> Result<()> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
    for &sample in &audio.samples {
        let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(scaled)
            .context("Failed to write audio sample")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn stereo_frames_are_averaged() {
        let mono = mix_to_mono(&[0.2, 0.4, -1.0, 1.0, 0.5], 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert_eq!(mono[1], 0.0);
    }

    #[test]
    fn pcm16_round_trip_keeps_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<f32> = (0..1_600).map(|i| ((i as f32) * 0.05).sin() * 0.5).collect();
        write_wav(&AudioData::new(samples.clone(), 16_000), &path).unwrap();

        let loaded = read_wav(&path).unwrap();
        assert_eq!(loaded.sample_rate, 16_000);
        assert_eq!(loaded.samples.len(), samples.len());
        for (a, b) in loaded.samples.iter().zip(&samples) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn stereo_file_is_mixed_down() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(0.5f32).unwrap();
            writer.write_sample(-0.1f32).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = read_wav(&path).unwrap();
        assert_eq!(loaded.samples.len(), 100);
        assert!(loaded.samples.iter().all(|s| (s - 0.2).abs() < 1e-6));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_wav("/definitely/not/here.wav").unwrap_err();
        assert!(format!("{:#}", err).contains("here.wav"));
    }
}
