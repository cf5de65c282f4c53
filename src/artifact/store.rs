//! Artifact store trait.
//!
//! The upload seam is a trait so the deployment flow can be exercised in
//! tests without talking to a real object store.

use async_trait::async_trait;

use crate::error::Result;

use super::bundle::{ArtifactBundle, BundleLocation};

/// Storage backend for deployment bundles.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Uploads a bundle and returns its remote location.
    ///
    /// Implementations are expected to be idempotent for content-addressed
    /// keys: uploading the same bundle twice must return the same location.
    async fn upload(&self, bundle: &ArtifactBundle) -> Result<BundleLocation>;

    /// Returns a short identifier for the backend type.
    fn backend_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store used to exercise the trait seam.
    struct FakeStore {
        bucket: String,
        uploads: AtomicUsize,
    }

    #[async_trait]
    impl ArtifactStore for FakeStore {
        async fn upload(&self, bundle: &ArtifactBundle) -> Result<BundleLocation> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(bundle.location_in(&self.bucket, None))
        }

        fn backend_type(&self) -> &'static str {
            "fake"
        }
    }

    #[tokio::test]
    async fn test_upload_returns_content_addressed_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.zip");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"bundle")
            .unwrap();

        let bundle = ArtifactBundle::from_path(&path).unwrap();
        let store = FakeStore {
            bucket: String::from("deploy-bundles"),
            uploads: AtomicUsize::new(0),
        };

        let location = store.upload(&bundle).await.unwrap();
        assert_eq!(location.bucket, "deploy-bundles");
        assert_eq!(location.key, bundle.object_key(None));
        assert_eq!(store.uploads.load(Ordering::SeqCst), 1);
    }
}
