//! ONNX Runtime separation backend (feature = "onnx")
//!
//! Expects a model exported with input shape (1, 2, frames) and output shape
//! (1, 4, 2, frames), stems in [drums, bass, other, vocals] order.

use std::path::Path;
use std::sync::Mutex;

use log::{debug, info, warn};
use ndarray::Array3;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::Session;
use ort::value::Tensor;

use crate::audio::{Waveform, SAMPLE_RATE};
use crate::error::{Result, UnmixError};
use crate::model::separator::{ApplyOptions, Separator, NUM_STEMS};

/// Chunk length when splitting long tracks
const SEGMENT_FRAMES: usize = 10 * SAMPLE_RATE as usize;

/// Maximum offset used for shift averaging (0.5 s)
const MAX_SHIFT_FRAMES: usize = SAMPLE_RATE as usize / 2;

pub struct OrtSeparator {
    session: Mutex<Session>,
}

impl OrtSeparator {
    /// Load a serialized model and bind it to a compute device.
    ///
    /// Only the CPU provider is wired up; other device identifiers fall back
    /// with a warning.
    pub fn load(path: &Path, device: &str) -> Result<Self> {
        if device != "cpu" {
            warn!("device '{}' is not supported by the onnx backend, using cpu", device);
        }

        let session = Session::builder()
            .map_err(|e| UnmixError::Inference {
                reason: format!("failed to create session builder: {}", e),
            })?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(|e| UnmixError::Inference {
                reason: format!("failed to configure CPU provider: {}", e),
            })?
            .commit_from_file(path)
            .map_err(|e| UnmixError::Inference {
                reason: format!("failed to load model from {}: {}", path.display(), e),
            })?;

        info!("loaded onnx model from {}", path.display());
        Ok(Self {
            session: Mutex::new(session),
        })
    }

    /// One forward pass over the whole buffer.
    fn run_once(&self, wav: &Waveform) -> Result<Vec<Waveform>> {
        let frames = wav.num_frames();
        let mut input = Array3::<f32>::zeros((1, 2, frames));
        input
            .slice_mut(ndarray::s![0, 0, ..])
            .assign(&ndarray::ArrayView1::from(wav.channel(0)));
        input
            .slice_mut(ndarray::s![0, 1, ..])
            .assign(&ndarray::ArrayView1::from(wav.channel(1)));

        let tensor = Tensor::from_array(input).map_err(|e| UnmixError::Inference {
            reason: format!("failed to create input tensor: {}", e),
        })?;

        let mut session = self.session.lock().map_err(|_| UnmixError::Inference {
            reason: "failed to acquire session lock".to_string(),
        })?;

        let input_name = session
            .inputs
            .first()
            .ok_or_else(|| UnmixError::Inference {
                reason: "model has no input tensors defined".to_string(),
            })?
            .name
            .clone();

        let outputs = session
            .run(ort::inputs![input_name.as_str() => tensor])
            .map_err(|e| UnmixError::Inference {
                reason: format!("inference failed: {}", e),
            })?;

        let output = outputs
            .iter()
            .next()
            .map(|(_, v)| v)
            .ok_or_else(|| UnmixError::Inference {
                reason: "no output tensor from model".to_string(),
            })?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| UnmixError::Inference {
                reason: format!("failed to extract output tensor: {}", e),
            })?;

        let shape: Vec<i64> = shape.iter().copied().collect();
        if shape.len() != 4 || shape[0] != 1 || shape[1] != NUM_STEMS as i64 || shape[2] != 2 {
            return Err(UnmixError::Inference {
                reason: format!("unexpected output shape {:?}, expected (1, 4, 2, frames)", shape),
            });
        }

        let out_frames = shape[3] as usize;
        if data.len() != NUM_STEMS * 2 * out_frames {
            return Err(UnmixError::Inference {
                reason: format!(
                    "output buffer length {} does not match shape {:?}",
                    data.len(),
                    shape
                ),
            });
        }

        // Row-major layout: stem0_left, stem0_right, stem1_left, ...
        let copy_frames = out_frames.min(frames);
        let mut stems = Vec::with_capacity(NUM_STEMS);
        for stem_idx in 0..NUM_STEMS {
            let offset = stem_idx * 2 * out_frames;
            let mut left = vec![0.0; frames];
            let mut right = vec![0.0; frames];
            left[..copy_frames].copy_from_slice(&data[offset..offset + copy_frames]);
            right[..copy_frames]
                .copy_from_slice(&data[offset + out_frames..offset + out_frames + copy_frames]);
            stems.push(Waveform::new(left, right)?);
        }
        Ok(stems)
    }

    /// Run over the track, optionally in fixed-length segments.
    fn run_segments(&self, wav: &Waveform, split: bool, progress: bool) -> Result<Vec<Waveform>> {
        let frames = wav.num_frames();
        if !split || frames <= SEGMENT_FRAMES {
            return self.run_once(wav);
        }

        let num_segments = frames.div_ceil(SEGMENT_FRAMES);
        let mut left: Vec<Vec<f32>> = vec![Vec::with_capacity(frames); NUM_STEMS];
        let mut right: Vec<Vec<f32>> = vec![Vec::with_capacity(frames); NUM_STEMS];

        for (i, start) in (0..frames).step_by(SEGMENT_FRAMES).enumerate() {
            let end = (start + SEGMENT_FRAMES).min(frames);
            if progress {
                info!("segment {}/{}", i + 1, num_segments);
            } else {
                debug!("segment {}/{}", i + 1, num_segments);
            }

            let segment = Waveform::new(
                wav.channel(0)[start..end].to_vec(),
                wav.channel(1)[start..end].to_vec(),
            )?;
            let stems = self.run_once(&segment)?;
            for (stem_idx, stem) in stems.iter().enumerate() {
                left[stem_idx].extend_from_slice(stem.channel(0));
                right[stem_idx].extend_from_slice(stem.channel(1));
            }
        }

        left.into_iter()
            .zip(right)
            .map(|(l, r)| Waveform::new(l, r))
            .collect()
    }
}

impl Separator for OrtSeparator {
    fn apply(&self, wav: &Waveform, opts: &ApplyOptions) -> Result<Vec<Waveform>> {
        if opts.shifts == 0 {
            return self.run_segments(wav, opts.split, opts.progress);
        }

        // Average predictions over deterministic time shifts. Each pass
        // prepends `offset` zeros, runs the model, then realigns.
        let frames = wav.num_frames();
        let shifts = opts.shifts as usize;
        let mut accumulated: Vec<Waveform> = (0..NUM_STEMS).map(|_| Waveform::silence(frames)).collect();

        for i in 0..shifts {
            let offset = i * MAX_SHIFT_FRAMES / shifts;
            let mut left = vec![0.0; offset + frames];
            let mut right = vec![0.0; offset + frames];
            left[offset..].copy_from_slice(wav.channel(0));
            right[offset..].copy_from_slice(wav.channel(1));

            let shifted = Waveform::new(left, right)?;
            let stems = self.run_segments(&shifted, opts.split, opts.progress)?;

            for (acc, stem) in accumulated.iter_mut().zip(&stems) {
                for ch in 0..2 {
                    let out = acc.channel_mut(ch);
                    let src = &stem.channel(ch)[offset..offset + frames];
                    for (o, s) in out.iter_mut().zip(src) {
                        *o += s;
                    }
                }
            }
        }

        let scale = 1.0 / shifts as f32;
        for stem in &mut accumulated {
            stem.map_in_place(|s| s * scale);
        }
        Ok(accumulated)
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}
