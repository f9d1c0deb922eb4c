//! Pretrained model catalog
//!
//! Maps canonical weight filenames to their expected SHA-256 digests and the
//! remote location they can be fetched from. The catalog is constructed once
//! at startup and passed by reference; it is never mutated afterwards. A
//! filename absent from the catalog means the model is user-provided: no
//! download, no verification.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Remote location of the reference pretrained weights
pub const DEFAULT_BASE_URL: &str = "https://dl.fbaipublicfiles.com/demucs/v2.0/";

/// A user-supplied model name plus the quantized flag.
///
/// Maps deterministically to a canonical weight filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIdentifier {
    pub name: String,
    pub quantized: bool,
}

impl ModelIdentifier {
    pub fn new(name: impl Into<String>, quantized: bool) -> Self {
        Self {
            name: name.into(),
            quantized,
        }
    }

    /// Canonical weight filename: `<name>.th`, or `<name>.th.gz` when
    /// quantized.
    pub fn filename(&self) -> String {
        if self.quantized {
            format!("{}.th.gz", self.name)
        } else {
            format!("{}.th", self.name)
        }
    }
}

/// Static table of known pretrained weight files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PretrainedCatalog {
    base_url: String,
    checksums: HashMap<String, String>,
}

impl PretrainedCatalog {
    /// Build a catalog with explicit entries. Used by tests and custom
    /// deployments.
    pub fn with_entries<I, K, V>(base_url: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            base_url: base_url.into(),
            checksums: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load a catalog from a JSON file.
    ///
    /// Expected shape: `{"base_url": "...", "checksums": {"name.th": "<hex>"}}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = serde_json::from_str(&content)?;
        Ok(catalog)
    }

    /// Expected SHA-256 digest for a canonical filename, if it is a known
    /// pretrained model.
    pub fn digest(&self, filename: &str) -> Option<&str> {
        self.checksums.get(filename).map(String::as_str)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.checksums.contains_key(filename)
    }

    /// Remote URL for a canonical filename.
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}{}", self.base_url, filename)
    }

    pub fn len(&self) -> usize {
        self.checksums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checksums.is_empty()
    }
}

impl Default for PretrainedCatalog {
    /// The reference pretrained model set.
    fn default() -> Self {
        Self::with_entries(
            DEFAULT_BASE_URL,
            [
                (
                    "demucs.th",
                    "f6c4148ba0dc92242d82d7b3f2af55c77bd7cb4ff1a0a3028a523986f36a3cfd",
                ),
                (
                    "demucs.th.gz",
                    "6030f57f77560f57aaaff14c1bfcc808307224a7b2df6b1b87aaacf92f5c1884",
                ),
                (
                    "demucs_extra.th",
                    "3331bcc5d09ba1d791c3cf851970242b0bb229ce81dbada557b6d39e8c6a6a87",
                ),
                (
                    "demucs_extra.th.gz",
                    "3bd3054bdfa5c08a6ca5919b8f82f8e588cadf6e9e474fcd8b037de5f789a4a7",
                ),
                (
                    "light.th",
                    "79d1ee3c1541c729c552327756954340a1a46a11ce0009dea77dc583e4b6269c",
                ),
                (
                    "light.th.gz",
                    "98d8296d155ce117345daa5f70597ec8c9bd1ff44bd4ed403aaf5d8e805ae247",
                ),
                (
                    "light_extra.th",
                    "9e9b4af564229c80cc73c95d02d2058235bb054c6874b3cba4d5b26943a5ddcb",
                ),
                (
                    "light_extra.th.gz",
                    "7f3a163cba2332fe75178b5be81ddf26695fe5a4565f33c05e693b477f1c697d",
                ),
                (
                    "tasnet.th",
                    "be56693f6a5c4854b124f95bb9dd043f3167614898493738ab52e25648bec8a2",
                ),
                (
                    "tasnet_extra.th",
                    "0ccbece3acd98785a367211c9c35b1eadae8d148b0d37fe5a5494d6d335269b5",
                ),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_filename_mapping() {
        assert_eq!(ModelIdentifier::new("demucs", false).filename(), "demucs.th");
        assert_eq!(
            ModelIdentifier::new("demucs", true).filename(),
            "demucs.th.gz"
        );
        assert_eq!(
            ModelIdentifier::new("light_extra", false).filename(),
            "light_extra.th"
        );
    }

    #[test]
    fn test_default_catalog() {
        let catalog = PretrainedCatalog::default();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.contains("demucs.th"));
        assert!(!catalog.contains("demucs_custom.th"));
        assert_eq!(
            catalog.digest("tasnet.th"),
            Some("be56693f6a5c4854b124f95bb9dd043f3167614898493738ab52e25648bec8a2")
        );
        assert_eq!(
            catalog.url_for("demucs.th"),
            "https://dl.fbaipublicfiles.com/demucs/v2.0/demucs.th"
        );
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(
            br#"{"base_url": "http://example.com/weights/", "checksums": {"custom.th": "abc123"}}"#,
        )
        .unwrap();

        let catalog = PretrainedCatalog::from_json_file(&path).unwrap();
        assert_eq!(catalog.digest("custom.th"), Some("abc123"));
        assert_eq!(
            catalog.url_for("custom.th"),
            "http://example.com/weights/custom.th"
        );
    }

    #[test]
    fn test_from_json_file_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(PretrainedCatalog::from_json_file(&path).is_err());
    }
}
