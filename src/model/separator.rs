//! Source separation interface
//!
//! The neural network itself is a black box behind the [`Separator`] trait;
//! the pipeline only relies on the stem-order contract. This keeps the core
//! logic testable with a deterministic fake backend.

use crate::audio::Waveform;
use crate::error::Result;

/// Output stem order. This is a hard external contract: files are named and
/// ordered `[drums, bass, other, vocals]` regardless of input content.
pub const STEM_NAMES: [&str; 4] = ["drums", "bass", "other", "vocals"];

/// Number of output stems
pub const NUM_STEMS: usize = STEM_NAMES.len();

/// Quality/memory trade-offs passed through to the backend.
#[derive(Debug, Clone, Copy)]
pub struct ApplyOptions {
    /// Number of time shifts for equivariant stabilization. 0 disables
    /// shift averaging; higher values improve quality at a linear cost in
    /// separation time.
    pub shifts: u32,
    /// Apply the model to ~10 second chunks rather than the whole track at
    /// once. Saves memory on long inputs.
    pub split: bool,
    /// Whether the backend may report progress while it runs.
    pub progress: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            shifts: 0,
            split: true,
            progress: false,
        }
    }
}

/// A loaded separation model bound to a compute device.
pub trait Separator: Send + Sync {
    /// Separate a normalized waveform into exactly [`NUM_STEMS`] stems in
    /// [`STEM_NAMES`] order.
    fn apply(&self, wav: &Waveform, opts: &ApplyOptions) -> Result<Vec<Waveform>>;

    /// Backend identifier for logs
    fn name(&self) -> &'static str;
}
