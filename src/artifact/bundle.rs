//! Local deployment bundle handling.
//!
//! A bundle is the packaged application archive this tool uploads and the
//! Application Version points at. Bundles are content-addressed: the object
//! key is derived from a SHA-256 hash of the file contents, so re-deploying
//! an unchanged bundle reuses the existing object.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ArtifactError, BstalkError, Result};

/// Read buffer size for hashing, in bytes.
const HASH_BUF_SIZE: usize = 64 * 1024;

/// Bundle extension used when the path has none.
const DEFAULT_EXTENSION: &str = "zip";

/// A local deployment bundle, verified to exist and content-hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactBundle {
    /// Path to the bundle on the local filesystem.
    path: PathBuf,
    /// Hex-encoded SHA-256 of the bundle contents.
    content_hash: String,
    /// Bundle size in bytes.
    size_bytes: u64,
}

/// The remote location of an uploaded bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BundleLocation {
    /// Object store bucket.
    pub bucket: String,
    /// Object key within the bucket.
    pub key: String,
}

impl ArtifactBundle {
    /// References a bundle at the given path.
    ///
    /// This is the single locally-detectable failure point of a deployment:
    /// a missing bundle aborts the whole manifest build before any
    /// descriptor is emitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, is not a regular file,
    /// or cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let metadata = std::fs::metadata(path).map_err(|_| {
            BstalkError::Artifact(ArtifactError::BundleNotFound {
                path: path.to_path_buf(),
            })
        })?;

        if !metadata.is_file() {
            return Err(BstalkError::Artifact(ArtifactError::NotAFile {
                path: path.to_path_buf(),
            }));
        }

        let content_hash = hash_file(path)?;
        debug!(
            "Referenced bundle {} ({} bytes, sha256 {})",
            path.display(),
            metadata.len(),
            &content_hash[..8]
        );

        Ok(Self {
            path: path.to_path_buf(),
            content_hash,
            size_bytes: metadata.len(),
        })
    }

    /// Returns the local path of the bundle.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the hex-encoded SHA-256 of the bundle contents.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Returns the first 8 characters of the content hash, for display.
    #[must_use]
    pub fn short_hash(&self) -> String {
        self.content_hash.chars().take(8).collect()
    }

    /// Returns the bundle size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Derives the content-addressed object key for this bundle.
    ///
    /// The key is `{prefix}{hash}.{ext}`, where the extension is taken from
    /// the local path (falling back to `zip`).
    #[must_use]
    pub fn object_key(&self, prefix: Option<&str>) -> String {
        let prefix = normalize_prefix(prefix);
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or(DEFAULT_EXTENSION);

        format!("{prefix}{}.{extension}", self.content_hash)
    }

    /// Returns the location this bundle would occupy in the given bucket,
    /// without uploading anything.
    #[must_use]
    pub fn location_in(&self, bucket: &str, prefix: Option<&str>) -> BundleLocation {
        BundleLocation {
            bucket: bucket.to_string(),
            key: self.object_key(prefix),
        }
    }
}

impl BundleLocation {
    /// Creates a new bundle location.
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for BundleLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Normalizes an optional key prefix to either empty or `.../`-terminated.
fn normalize_prefix(prefix: Option<&str>) -> String {
    prefix
        .map(|p| {
            let p = p.trim_matches('/');
            if p.is_empty() {
                String::new()
            } else {
                format!("{p}/")
            }
        })
        .unwrap_or_default()
}

/// Computes the streaming SHA-256 hash of a file.
fn hash_file(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|e| {
        BstalkError::Artifact(ArtifactError::ReadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    })?;

    let mut reader = std::io::BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_BUF_SIZE];

    loop {
        let read = reader.read(&mut buf).map_err(|e| {
            BstalkError::Artifact(ArtifactError::ReadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })?;

        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_bundle(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_missing_bundle_fails() {
        let result = ArtifactBundle::from_path("/nonexistent/app.zip");
        assert!(matches!(
            result,
            Err(BstalkError::Artifact(ArtifactError::BundleNotFound { .. }))
        ));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = ArtifactBundle::from_path(dir.path());
        assert!(matches!(
            result,
            Err(BstalkError::Artifact(ArtifactError::NotAFile { .. }))
        ));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bundle(&dir, "app.zip", b"bundle-bytes");

        let first = ArtifactBundle::from_path(&path).unwrap();
        let second = ArtifactBundle::from_path(&path).unwrap();

        assert_eq!(first.content_hash(), second.content_hash());
        assert_eq!(first.size_bytes(), 12);
    }

    #[test]
    fn test_different_contents_different_keys() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_bundle(&dir, "a.zip", b"version-one");
        let b = write_bundle(&dir, "b.zip", b"version-two");

        let bundle_a = ArtifactBundle::from_path(a).unwrap();
        let bundle_b = ArtifactBundle::from_path(b).unwrap();

        assert_ne!(bundle_a.object_key(None), bundle_b.object_key(None));
    }

    #[test]
    fn test_object_key_prefix_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bundle(&dir, "service.war", b"war-bytes");
        let bundle = ArtifactBundle::from_path(path).unwrap();

        let key = bundle.object_key(Some("/apps/prod/"));
        assert!(key.starts_with("apps/prod/"));
        assert!(key.ends_with(".war"));

        let bare = bundle.object_key(None);
        assert_eq!(bare, format!("{}.war", bundle.content_hash()));
    }

    #[test]
    fn test_location_display() {
        let location = BundleLocation::new("deploy-bundles", "abc123.zip");
        assert_eq!(location.to_string(), "s3://deploy-bundles/abc123.zip");
    }
}
