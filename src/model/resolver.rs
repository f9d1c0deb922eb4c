//! Model resolution
//!
//! Turns a user-supplied model name plus the quantized flag into a local
//! weight file, downloading it from the catalog's remote location when
//! permitted. Downloads are opt-in to avoid surprising network activity;
//! checksum verification happens downstream regardless of how the file got
//! on disk.

use std::fs;
use std::path::PathBuf;

use log::info;

use crate::error::{Result, UnmixError};
use crate::model::catalog::{ModelIdentifier, PretrainedCatalog};
use crate::model::fetch::fetch_artifact;

/// A resolved weight file plus its expected digest, if any.
///
/// `digest` is `None` for user-provided models, which are never verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub path: PathBuf,
    pub digest: Option<String>,
}

pub struct ModelResolver<'a> {
    catalog: &'a PretrainedCatalog,
    models_dir: PathBuf,
    allow_download: bool,
}

impl<'a> ModelResolver<'a> {
    pub fn new(catalog: &'a PretrainedCatalog, models_dir: PathBuf, allow_download: bool) -> Self {
        Self {
            catalog,
            models_dir,
            allow_download,
        }
    }

    /// Resolve a model name to a local weight file.
    ///
    /// An existing local file always wins, whether or not the name is in the
    /// catalog. Otherwise the name must match the catalog and downloads must
    /// be enabled, or resolution fails with `UnknownModel` / `ModelMissing`
    /// respectively.
    pub fn resolve(&self, name: &str, quantized: bool) -> Result<ResolvedModel> {
        let id = ModelIdentifier::new(name, quantized);
        let filename = id.filename();
        let path = self.models_dir.join(&filename);
        let digest = self.catalog.digest(&filename).map(str::to_owned);

        if path.is_file() {
            return Ok(ResolvedModel { path, digest });
        }

        let Some(digest) = digest else {
            return Err(UnmixError::UnknownModel {
                name: name.to_string(),
            });
        };

        if !self.allow_download {
            return Err(UnmixError::ModelMissing {
                path: path.display().to_string(),
            });
        }

        fs::create_dir_all(&self.models_dir)?;
        let url = self.catalog.url_for(&filename);
        info!("Downloading pre-trained model weights, this could take a while...");

        let mut last_reported: u64 = 0;
        fetch_artifact(&url, &path, &mut |transferred, total| {
            // Report roughly every 8 MiB to keep the log readable
            if transferred - last_reported >= 8 * 1024 * 1024 {
                last_reported = transferred;
                if total > 0 {
                    info!(
                        "downloaded {:.1}% ({}/{} bytes)",
                        transferred as f64 / total as f64 * 100.0,
                        transferred,
                        total
                    );
                } else {
                    info!("downloaded {} bytes", transferred);
                }
            }
        })?;

        Ok(ResolvedModel {
            path,
            digest: Some(digest),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_catalog() -> PretrainedCatalog {
        PretrainedCatalog::with_entries(
            "http://127.0.0.1:1/never-contacted/",
            [("known.th", "00ff")],
        )
    }

    #[test]
    fn test_unknown_model_no_local_file() {
        let dir = tempdir().unwrap();
        let catalog = test_catalog();
        let resolver = ModelResolver::new(&catalog, dir.path().to_path_buf(), true);

        let err = resolver.resolve("mystery", false).unwrap_err();
        assert!(matches!(err, UnmixError::UnknownModel { name } if name == "mystery"));
    }

    #[test]
    fn test_known_model_download_disabled() {
        let dir = tempdir().unwrap();
        let catalog = test_catalog();
        let resolver = ModelResolver::new(&catalog, dir.path().to_path_buf(), false);

        // The catalog's base URL is unreachable, so this also proves no
        // network access is attempted.
        let err = resolver.resolve("known", false).unwrap_err();
        assert!(matches!(err, UnmixError::ModelMissing { .. }));
    }

    #[test]
    fn test_existing_local_file_short_circuits() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("known.th");
        std::fs::write(&path, b"weights").unwrap();

        let catalog = test_catalog();
        let resolver = ModelResolver::new(&catalog, dir.path().to_path_buf(), false);

        let resolved = resolver.resolve("known", false).unwrap();
        assert_eq!(resolved.path, path);
        // Digest still returned so verification happens downstream
        assert_eq!(resolved.digest.as_deref(), Some("00ff"));
    }

    #[test]
    fn test_local_user_model_has_no_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mine.th.gz");
        std::fs::write(&path, b"weights").unwrap();

        let catalog = test_catalog();
        let resolver = ModelResolver::new(&catalog, dir.path().to_path_buf(), false);

        let resolved = resolver.resolve("mine", true).unwrap();
        assert_eq!(resolved.path, path);
        assert_eq!(resolved.digest, None);
    }

    #[test]
    fn test_quantized_flag_changes_filename() {
        let dir = tempdir().unwrap();
        // Only the unquantized file exists
        std::fs::write(dir.path().join("known.th"), b"weights").unwrap();

        let catalog = test_catalog();
        let resolver = ModelResolver::new(&catalog, dir.path().to_path_buf(), false);

        // known.th.gz is not in the catalog and not on disk
        let err = resolver.resolve("known", true).unwrap_err();
        assert!(matches!(err, UnmixError::UnknownModel { .. }));
    }
}
