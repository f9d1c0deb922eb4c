//! Separation pipeline
//!
//! Per-track orchestration around the opaque model call: read, discretize,
//! normalize, infer, denormalize, write stems. Tracks are processed strictly
//! sequentially; one bad track never aborts its siblings.

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::audio::{io as audio_io, Waveform};
use crate::error::{Result, UnmixError};
use crate::model::separator::{ApplyOptions, Separator, NUM_STEMS, STEM_NAMES};

/// Standard deviations below this are treated as degenerate (silent or
/// constant input) and scaling is bypassed.
const MIN_STD: f32 = 1e-8;

/// Per-track normalization statistics, derived from the channel-averaged
/// mono reference signal. The same stats must be applied inversely to every
/// stem after inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationStats {
    pub mean: f32,
    pub std: f32,
}

impl NormalizationStats {
    /// Compute mean and sample standard deviation of the mono reference.
    ///
    /// A zero or non-finite deviation (pure silence, constant DC) would make
    /// normalization produce non-finite samples, so it falls back to 1.0:
    /// the mean is still removed but amplitudes pass through unscaled.
    pub fn from_reference(wav: &Waveform) -> Self {
        let frames = wav.num_frames();
        if frames == 0 {
            return Self { mean: 0.0, std: 1.0 };
        }

        let mut sum = 0.0f64;
        for i in 0..frames {
            sum += wav.frame_mean(i) as f64;
        }
        let mean = sum / frames as f64;

        let mut sum_sq = 0.0f64;
        for i in 0..frames {
            let d = wav.frame_mean(i) as f64 - mean;
            sum_sq += d * d;
        }
        // Sample (N-1) estimator, matching the reference toolchain
        let std = if frames > 1 {
            (sum_sq / (frames - 1) as f64).sqrt() as f32
        } else {
            0.0
        };

        let std = if !std.is_finite() || std < MIN_STD {
            warn!("degenerate reference signal (std = {}), skipping amplitude scaling", std);
            1.0
        } else {
            std
        };

        Self {
            mean: mean as f32,
            std,
        }
    }
}

/// Round every sample to the nearest 1/2^15 step.
///
/// Reproduces the information loss of 16-bit fixed-point training data and
/// must run before the statistics are computed.
pub fn discretize(wav: &mut Waveform) {
    wav.map_in_place(|s| (s * 32768.0).round() / 32768.0);
}

/// `(s - mean) / std`, producing a fresh buffer for inference.
pub fn normalize(wav: &Waveform, stats: &NormalizationStats) -> Waveform {
    let mut out = wav.clone();
    out.map_in_place(|s| (s - stats.mean) / stats.std);
    out
}

/// `s * std + mean`, in place, undoing [`normalize`] with the same stats.
pub fn denormalize(wav: &mut Waveform, stats: &NormalizationStats) {
    wav.map_in_place(|s| s * stats.std + stats.mean);
}

/// Output format and quality options for one run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub shifts: u32,
    pub split: bool,
    /// Write 32-bit float stems instead of 16-bit PCM
    pub float32: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            shifts: 0,
            split: true,
            float32: false,
        }
    }
}

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub separated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub written: Vec<PathBuf>,
}

/// Owns one run: the loaded model (behind the [`Separator`] seam), the
/// output layout, and the per-track processing loop.
pub struct SeparationPipeline<'a> {
    separator: &'a dyn Separator,
    out_dir: PathBuf,
    model_name: String,
    options: PipelineOptions,
}

impl<'a> SeparationPipeline<'a> {
    pub fn new(
        separator: &'a dyn Separator,
        out_dir: PathBuf,
        model_name: impl Into<String>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            separator,
            out_dir,
            model_name: model_name.into(),
            options,
        }
    }

    /// Directory the stems of one track are written into:
    /// `<out>/<model_name>/<track_stem>/`
    pub fn track_output_dir(&self, track: &Path) -> PathBuf {
        let track_stem = track
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "track".to_string());
        self.out_dir.join(&self.model_name).join(track_stem)
    }

    /// Separate one track and write its four stems.
    ///
    /// Returns the written paths in stem order.
    pub fn process_track(&self, track: &Path) -> Result<Vec<PathBuf>> {
        if !track.exists() {
            return Err(UnmixError::TrackMissing {
                path: track.display().to_string(),
            });
        }

        info!("Separating track {}", track.display());
        let mut wav = audio_io::read_track(track)?;

        // Fixed-point pre-pass first so the statistics match the training
        // distribution.
        discretize(&mut wav);
        let stats = NormalizationStats::from_reference(&wav);
        let normalized = normalize(&wav, &stats);

        let apply_opts = ApplyOptions {
            shifts: self.options.shifts,
            split: self.options.split,
            progress: true,
        };
        let mut stems = self.separator.apply(&normalized, &apply_opts)?;
        if stems.len() != NUM_STEMS {
            return Err(UnmixError::StemCount { count: stems.len() });
        }

        // Every stem gets the same stats back, never per-stem renormalization
        for stem in &mut stems {
            denormalize(stem, &stats);
        }

        let dir = self.track_output_dir(track);
        fs::create_dir_all(&dir)?;

        let mut written = Vec::with_capacity(NUM_STEMS);
        for (stem, name) in stems.iter().zip(STEM_NAMES) {
            let path = dir.join(format!("{}.wav", name));
            audio_io::write_stem(&path, stem, self.options.float32)?;
            written.push(path);
        }
        Ok(written)
    }

    /// Process a batch of tracks sequentially with per-track isolation.
    ///
    /// A missing track logs a skip diagnostic; any other per-track failure
    /// logs an error; both let the batch continue.
    pub fn run(&self, tracks: &[PathBuf]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for track in tracks {
            match self.process_track(track) {
                Ok(paths) => {
                    summary.separated += 1;
                    summary.written.extend(paths);
                }
                Err(err @ UnmixError::TrackMissing { .. }) => {
                    warn!("{}, skipping", err);
                    summary.skipped += 1;
                }
                Err(err) => {
                    error!("failed to separate {}: {}", track.display(), err);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
