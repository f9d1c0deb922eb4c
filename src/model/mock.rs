//! Mock separation backend
//!
//! Produces deterministic fake stems by scaling the input with a fixed gain
//! per stem. Useful for pipeline tests and for dry-running the CLI without
//! real weights (`--features mock-model`).

use crate::audio::Waveform;
use crate::error::Result;
use crate::model::separator::{ApplyOptions, Separator, NUM_STEMS};

/// Deterministic fake backend. The four gains sum to 1.0 so the stems mix
/// back to approximately the input.
pub struct MockSeparator {
    gains: [f32; NUM_STEMS],
}

impl MockSeparator {
    pub fn new() -> Self {
        Self {
            gains: [0.4, 0.3, 0.2, 0.1],
        }
    }

    /// Build a mock with explicit per-stem gains.
    pub fn with_gains(gains: [f32; NUM_STEMS]) -> Self {
        Self { gains }
    }
}

impl Default for MockSeparator {
    fn default() -> Self {
        Self::new()
    }
}

impl Separator for MockSeparator {
    fn apply(&self, wav: &Waveform, _opts: &ApplyOptions) -> Result<Vec<Waveform>> {
        Ok(self
            .gains
            .iter()
            .map(|&gain| {
                let mut stem = wav.clone();
                stem.map_in_place(|s| s * gain);
                stem
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_returns_four_stems() {
        let wav = Waveform::new(vec![1.0, -1.0], vec![0.5, -0.5]).unwrap();
        let stems = MockSeparator::new()
            .apply(&wav, &ApplyOptions::default())
            .unwrap();

        assert_eq!(stems.len(), NUM_STEMS);
        for stem in &stems {
            assert_eq!(stem.num_frames(), wav.num_frames());
        }
    }

    #[test]
    fn test_mock_is_deterministic() {
        let wav = Waveform::new(vec![0.25; 100], vec![-0.25; 100]).unwrap();
        let sep = MockSeparator::new();
        let a = sep.apply(&wav, &ApplyOptions::default()).unwrap();
        let b = sep.apply(&wav, &ApplyOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mock_gains_applied_in_order() {
        let wav = Waveform::new(vec![1.0], vec![1.0]).unwrap();
        let stems = MockSeparator::with_gains([0.4, 0.3, 0.2, 0.1])
            .apply(&wav, &ApplyOptions::default())
            .unwrap();

        assert_eq!(stems[0].channel(0)[0], 0.4);
        assert_eq!(stems[1].channel(0)[0], 0.3);
        assert_eq!(stems[2].channel(0)[0], 0.2);
        assert_eq!(stems[3].channel(0)[0], 0.1);
    }
}
