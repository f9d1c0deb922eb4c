//! Error handling for unmix
//!
//! All fatal errors carry enough context for a useful diagnostic, and the
//! acquisition errors include recovery suggestions surfaced by the CLI.

use thiserror::Error;

/// Result type alias for unmix operations
pub type Result<T> = std::result::Result<T, UnmixError>;

/// Main error type for unmix operations
#[derive(Error, Debug)]
pub enum UnmixError {
    // Model acquisition errors
    #[error("No pretrained model '{name}'")]
    UnknownModel { name: String },

    #[error(
        "Could not find model {path}, however a matching pretrained model exists, \
         to download it, use --dl"
    )]
    ModelMissing { path: String },

    #[error("Download from {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error(
        "Invalid sha256 signature for the file {path}. Expected {expected} but got {actual}"
    )]
    Integrity {
        path: String,
        expected: String,
        actual: String,
    },

    // Per-track errors
    #[error("File {path} does not exist")]
    TrackMissing { path: String },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Inference errors
    #[error("Model returned {count} stems, expected 4")]
    StemCount { count: usize },

    #[error("Inference failed: {reason}")]
    Inference { reason: String },

    #[error("No inference backend available: {hint}")]
    BackendUnavailable { hint: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UnmixError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            UnmixError::UnknownModel { .. } => "UNKNOWN_MODEL",
            UnmixError::ModelMissing { .. } => "MODEL_MISSING",
            UnmixError::Fetch { .. } => "FETCH_FAILED",
            UnmixError::Integrity { .. } => "INTEGRITY_FAILED",
            UnmixError::TrackMissing { .. } => "TRACK_MISSING",
            UnmixError::InvalidAudio { .. } => "INVALID_AUDIO",
            UnmixError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            UnmixError::StemCount { .. } => "STEM_COUNT",
            UnmixError::Inference { .. } => "INFERENCE_FAILED",
            UnmixError::BackendUnavailable { .. } => "BACKEND_UNAVAILABLE",
            UnmixError::Io(_) => "IO_ERROR",
            UnmixError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the batch may continue after this error.
    ///
    /// Only per-track problems are recoverable; anything touching the model
    /// artifact aborts the whole run since the model is shared by all tracks.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            UnmixError::TrackMissing { .. }
                | UnmixError::InvalidAudio { .. }
                | UnmixError::UnsupportedFormat { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            UnmixError::UnknownModel { .. } => vec![
                "Check the model name against the list of pretrained models",
                "For a local model, place the .th file in the models directory first",
            ],
            UnmixError::ModelMissing { .. } => vec![
                "Pass --dl to download the pretrained weights automatically",
            ],
            UnmixError::Fetch { .. } => vec![
                "Check your network connection",
                "Re-run the command to restart the download from scratch",
            ],
            UnmixError::Integrity { .. } => vec![
                "If you have recently updated, the checkpoints may have changed",
                "A previous download may not have run to completion",
                "Delete the file and try again",
            ],
            UnmixError::TrackMissing { .. } => vec![
                "If the path contains spaces, surround the entire path with quotes",
            ],
            UnmixError::InvalidAudio { .. } => vec![
                "Try converting the file to WAV format first",
                "Check if the file plays in another application",
            ],
            UnmixError::UnsupportedFormat { .. } => vec![
                "Convert the track to mono or stereo WAV",
            ],
            UnmixError::BackendUnavailable { .. } => vec![
                "Rebuild with --features onnx for real inference",
                "Rebuild with --features mock-model for a dry run",
            ],
            _ => vec![],
        }
    }
}
