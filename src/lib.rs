//! unmix - Music Source Separation
//!
//! Separates a mixed audio track into four stems (drums, bass, other,
//! vocals) with a pretrained neural model.
//!
//! # Architecture
//!
//! Two subsystems do the real work:
//! - Model acquisition: resolving a model name to a local weight file,
//!   downloading it when permitted and verifying its SHA-256 digest
//!   ([`model`]).
//! - The separation pipeline: normalization, inference through the opaque
//!   [`model::Separator`] seam, denormalization and 16-bit/float stem
//!   output ([`pipeline`]).

pub mod audio;
pub mod cli;
pub mod error;
pub mod model;
pub mod pipeline;

pub use error::{Result, UnmixError};
