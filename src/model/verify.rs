//! Weight file integrity verification
//!
//! Verification is unconditional whenever a digest is known, regardless of
//! whether the file was just downloaded or already on disk: a pre-existing
//! file can be stale or corrupted too. A mismatched file is kept on disk so
//! the user can inspect it.

use std::fs;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Result, UnmixError};

const READ_BLOCK: usize = 8192;

/// Compare the SHA-256 digest of `path` against `expected`.
///
/// `expected` must be the lowercase hex digest. Success is silent; a
/// mismatch returns [`UnmixError::Integrity`] naming both digests.
pub fn verify_checksum(path: &Path, expected: &str) -> Result<()> {
    let actual = file_sha256(path)?;
    if actual != expected {
        return Err(UnmixError::Integrity {
            path: path.display().to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Streaming SHA-256 of a file, rendered as lowercase hex.
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; READ_BLOCK];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    // SHA-256 of the ASCII string "hello"
    const HELLO_SHA256: &str =
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_verify_match() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weights.th");
        fs::write(&path, b"hello").unwrap();

        assert!(verify_checksum(&path, HELLO_SHA256).is_ok());
    }

    #[test]
    fn test_verify_mismatch_reports_both_digests() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weights.th");
        fs::write(&path, b"hello world").unwrap();

        let err = verify_checksum(&path, HELLO_SHA256).unwrap_err();
        match err {
            UnmixError::Integrity {
                expected, actual, ..
            } => {
                assert_eq!(expected, HELLO_SHA256);
                assert_ne!(actual, expected);
                assert_eq!(actual.len(), 64);
            }
            other => panic!("expected Integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_keeps_mismatched_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weights.th");
        fs::write(&path, b"corrupted").unwrap();

        assert!(verify_checksum(&path, HELLO_SHA256).is_err());
        // The file is preserved for inspection
        assert!(path.exists());
    }

    #[test]
    fn test_single_byte_corruption_detected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weights.th");
        fs::write(&path, b"hello").unwrap();
        let good = file_sha256(&path).unwrap();

        let mut file = fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.write_all(b"j").unwrap(); // flip the first byte
        drop(file);

        assert!(verify_checksum(&path, &good).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = file_sha256(Path::new("/nonexistent/weights.th"));
        assert!(matches!(result, Err(UnmixError::Io(_))));
    }
}
