//! Weight artifact download
//!
//! Streams a remote artifact to disk with all-or-nothing semantics: if
//! anything fails mid-transfer the partial file is removed before the error
//! propagates, so a half-written artifact can never pass a later existence
//! check. There is no resume; a retry restarts from byte zero.
//!
//! Checksum verification is deliberately not done here; callers compose
//! [`fetch_artifact`] with [`crate::model::verify::verify_checksum`].

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use log::debug;

use crate::error::{Result, UnmixError};

const CHUNK_SIZE: usize = 4096;

/// Called after each chunk with (bytes transferred, total bytes).
///
/// `total` is 0 when the server did not declare a content length; it drives
/// progress display only and is never required for correctness.
pub type ProgressFn<'a> = dyn FnMut(u64, u64) + 'a;

/// Download `url` into `destination`, streaming in fixed-size chunks.
pub fn fetch_artifact(url: &str, destination: &Path, progress: &mut ProgressFn<'_>) -> Result<()> {
    let result = stream_to_file(url, destination, progress);
    if result.is_err() && destination.exists() {
        // Never leave a partial artifact behind
        let _ = fs::remove_file(destination);
    }
    result
}

fn stream_to_file(url: &str, destination: &Path, progress: &mut ProgressFn<'_>) -> Result<()> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| UnmixError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let total = response.content_length().unwrap_or(0);
    debug!("fetching {} ({} bytes declared)", url, total);

    let mut output = fs::File::create(destination)?;
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut transferred: u64 = 0;

    loop {
        let n = response.read(&mut buffer).map_err(|e| UnmixError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if n == 0 {
            break;
        }
        output.write_all(&buffer[..n])?;
        transferred += n as u64;
        progress(transferred, total);
    }

    output.flush()?;
    Ok(())
}
