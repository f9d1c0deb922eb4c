//! Model acquisition and the separation backend seam
//!
//! This module covers everything between a model name on the command line
//! and a loaded, verified separator: the pretrained catalog, the artifact
//! fetcher, checksum verification, and resolution logic tying them together.

pub mod catalog;
pub mod fetch;
pub mod mock;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod resolver;
pub mod separator;
pub mod verify;

use std::path::Path;

use crate::error::Result;

pub use catalog::{ModelIdentifier, PretrainedCatalog};
pub use mock::MockSeparator;
pub use resolver::{ModelResolver, ResolvedModel};
pub use separator::{ApplyOptions, Separator, NUM_STEMS, STEM_NAMES};
pub use verify::verify_checksum;

/// Load the compiled-in separation backend for a resolved weight file.
#[cfg(feature = "onnx")]
pub fn load_separator(path: &Path, device: &str) -> Result<Box<dyn Separator>> {
    Ok(Box::new(onnx::OrtSeparator::load(path, device)?))
}

/// Load the compiled-in separation backend for a resolved weight file.
#[cfg(all(feature = "mock-model", not(feature = "onnx")))]
pub fn load_separator(_path: &Path, _device: &str) -> Result<Box<dyn Separator>> {
    Ok(Box::new(MockSeparator::new()))
}

/// Load the compiled-in separation backend for a resolved weight file.
#[cfg(not(any(feature = "onnx", feature = "mock-model")))]
pub fn load_separator(_path: &Path, _device: &str) -> Result<Box<dyn Separator>> {
    Err(crate::error::UnmixError::BackendUnavailable {
        hint: "this build has no inference backend; rebuild with --features onnx \
               (or --features mock-model for a dry run)"
            .to_string(),
    })
}
