//! WAV read/write adapters
//!
//! Tracks are imported with hound and converted to the fixed pipeline format:
//! 32-bit float stereo at 44100 Hz. Mono input is duplicated to both
//! channels, other sample rates are resampled with linear interpolation, and
//! anything beyond two channels is rejected.
//!
//! Stem output is written either as signed 16-bit PCM (default) or 32-bit
//! float, matching the reference toolchain's amplitude conventions: the
//! 16-bit path scales by 2^15, clamps to [-32768, 32767] and truncates.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::audio::buffer::{Waveform, NUM_CHANNELS, SAMPLE_RATE};
use crate::error::{Result, UnmixError};

/// Read a track into the fixed pipeline format.
pub fn read_track(path: &Path) -> Result<Waveform> {
    if !path.exists() {
        return Err(UnmixError::TrackMissing {
            path: path.display().to_string(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| UnmixError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let source_rate = spec.sample_rate;
    let channels = spec.channels as usize;

    if channels == 0 || channels > NUM_CHANNELS {
        return Err(UnmixError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", channels),
        });
    }

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    if interleaved.is_empty() {
        return Err(UnmixError::InvalidAudio {
            reason: "file contains no samples".to_string(),
            source: None,
        });
    }

    let mut planar = deinterleave(&interleaved, channels);

    // Mono is mixed to both channels unchanged.
    if channels == 1 {
        planar.push(planar[0].clone());
    }

    if source_rate != SAMPLE_RATE {
        planar = planar
            .into_iter()
            .map(|ch| resample_linear(&ch, SAMPLE_RATE as f64 / source_rate as f64))
            .collect();
    }

    let mut it = planar.into_iter();
    let left = it.next().unwrap_or_default();
    let right = it.next().unwrap_or_default();
    Waveform::new(left, right)
}

/// Write one stem at 44100 Hz.
///
/// `float32` selects IEEE float output; otherwise samples are quantized to
/// signed 16-bit.
pub fn write_stem(path: &Path, stem: &Waveform, float32: bool) -> Result<()> {
    let spec = WavSpec {
        channels: NUM_CHANNELS as u16,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: if float32 { 32 } else { 16 },
        sample_format: if float32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_io_error)?;

    for frame in 0..stem.num_frames() {
        for channel in 0..NUM_CHANNELS {
            let sample = stem.channel(channel)[frame];
            if float32 {
                writer.write_sample(sample).map_err(wav_io_error)?;
            } else {
                writer.write_sample(quantize_i16(sample)).map_err(wav_io_error)?;
            }
        }
    }

    writer.finalize().map_err(wav_io_error)?;
    Ok(())
}

/// Quantize one float sample to signed 16-bit.
///
/// Scales by 2^15, clamps to the representable range and truncates, so +1.0
/// maps to 32767 and -1.0 maps to -32768. Lossy by construction.
pub fn quantize_i16(sample: f32) -> i16 {
    (sample * 32768.0).clamp(-32768.0, 32767.0) as i16
}

fn wav_io_error(e: hound::Error) -> UnmixError {
    UnmixError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

/// Read samples from a WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| UnmixError::InvalidAudio {
                reason: format!("Failed to read float samples: {}", e),
                source: Some(Box::new(e)),
            }),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| UnmixError::InvalidAudio {
                    reason: format!("Failed to read 8-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| UnmixError::InvalidAudio {
                    reason: format!("Failed to read 16-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| UnmixError::InvalidAudio {
                    reason: format!("Failed to read 24-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| UnmixError::InvalidAudio {
                    reason: format!("Failed to read 32-bit int samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            _ => Err(UnmixError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

/// De-interleave samples from [L,R,L,R,...] to [[L,L,...], [R,R,...]]
fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels;
    let mut result = vec![Vec::with_capacity(frames); channels];

    for (i, sample) in samples.iter().enumerate() {
        result[i % channels].push(*sample);
    }

    result
}

/// Linear interpolation resampling
fn resample_linear(samples: &[f32], ratio: f64) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let source_len = samples.len();
    let target_len = ((source_len as f64) * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(target_len);

    for i in 0..target_len {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < source_len {
            samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
        } else if src_idx < source_len {
            samples[src_idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}
