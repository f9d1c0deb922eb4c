//! Audio buffers and WAV I/O

pub mod buffer;
pub mod io;

pub use buffer::{Waveform, NUM_CHANNELS, SAMPLE_RATE};
