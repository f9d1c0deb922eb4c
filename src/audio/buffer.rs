//! Stereo waveform buffer
//!
//! All audio flows through the pipeline as planar 32-bit float stereo at
//! 44100 Hz. The importer is responsible for converting anything else into
//! this format; everything downstream assumes it.

use crate::error::{Result, UnmixError};

/// Fixed pipeline sample rate in Hz
pub const SAMPLE_RATE: u32 = 44100;

/// Fixed pipeline channel count
pub const NUM_CHANNELS: usize = 2;

/// Planar stereo sample buffer at [`SAMPLE_RATE`].
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: [Vec<f32>; NUM_CHANNELS],
}

impl Waveform {
    /// Create a waveform from left and right channel data.
    ///
    /// Both channels must have the same number of frames.
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Result<Self> {
        if left.len() != right.len() {
            return Err(UnmixError::InvalidAudio {
                reason: format!(
                    "channel length mismatch: left {} frames, right {} frames",
                    left.len(),
                    right.len()
                ),
                source: None,
            });
        }
        Ok(Self {
            samples: [left, right],
        })
    }

    /// Create a silent waveform with the given number of frames.
    pub fn silence(frames: usize) -> Self {
        Self {
            samples: [vec![0.0; frames], vec![0.0; frames]],
        }
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    /// Duration in seconds at the fixed sample rate
    pub fn duration(&self) -> f64 {
        self.num_frames() as f64 / SAMPLE_RATE as f64
    }

    /// Immutable access to one channel (0 = left, 1 = right)
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Mutable access to one channel
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.samples[index]
    }

    /// Apply a function to every sample in place.
    pub fn map_in_place<F: Fn(f32) -> f32>(&mut self, f: F) {
        for channel in &mut self.samples {
            for sample in channel.iter_mut() {
                *sample = f(*sample);
            }
        }
    }

    /// Channel-averaged mono value at one frame
    pub fn frame_mean(&self, frame: usize) -> f32 {
        (self.samples[0][frame] + self.samples[1][frame]) / NUM_CHANNELS as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_mismatched_channels() {
        let result = Waveform::new(vec![0.0; 10], vec![0.0; 11]);
        assert!(matches!(result, Err(UnmixError::InvalidAudio { .. })));
    }

    #[test]
    fn test_silence() {
        let wav = Waveform::silence(441);
        assert_eq!(wav.num_frames(), 441);
        assert!((wav.duration() - 0.01).abs() < 1e-9);
        assert!(wav.channel(0).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_map_in_place() {
        let mut wav = Waveform::new(vec![1.0, -1.0], vec![0.5, -0.5]).unwrap();
        wav.map_in_place(|s| s * 2.0);
        assert_eq!(wav.channel(0), &[2.0, -2.0]);
        assert_eq!(wav.channel(1), &[1.0, -1.0]);
    }

    #[test]
    fn test_frame_mean() {
        let wav = Waveform::new(vec![1.0, 0.0], vec![0.0, 0.0]).unwrap();
        assert_eq!(wav.frame_mean(0), 0.5);
        assert_eq!(wav.frame_mean(1), 0.0);
    }
}
