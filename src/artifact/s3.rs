//! S3-based artifact store.
//!
//! Uploads deployment bundles to S3 under content-addressed keys. An object
//! that already exists under the derived key is not re-uploaded.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, info};

use crate::error::{ArtifactError, BstalkError, Result};

use super::bundle::{ArtifactBundle, BundleLocation};
use super::store::ArtifactStore;

/// S3-based artifact store.
#[derive(Debug)]
pub struct S3ArtifactStore {
    /// S3 client.
    client: Client,
    /// Bucket name.
    bucket: String,
    /// Key prefix.
    prefix: Option<String>,
}

impl S3ArtifactStore {
    /// Creates a new S3 artifact store.
    pub async fn new(bucket: &str, prefix: Option<&str>, region: Option<&str>) -> Self {
        let config = if let Some(region_str) = region {
            aws_config::from_env()
                .region(aws_config::Region::new(region_str.to_string()))
                .load()
                .await
        } else {
            aws_config::load_from_env().await
        };

        Self::with_client(Client::new(&config), bucket, prefix)
    }

    /// Creates a new S3 artifact store with an existing client.
    #[must_use]
    pub fn with_client(client: Client, bucket: &str, prefix: Option<&str>) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            prefix: prefix.map(ToString::to_string),
        }
    }

    /// Checks whether an object exists in the bucket.
    async fn object_exists(&self, key: &str) -> Result<bool> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(sdk_err) => {
                let service_err = sdk_err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(BstalkError::Artifact(ArtifactError::upload(
                        &self.bucket,
                        key,
                        format!("S3 head error: {service_err}"),
                    )))
                }
            }
        }
    }

    /// Uploads the bundle file under the given key.
    async fn put_bundle(&self, bundle: &ArtifactBundle, key: &str) -> Result<()> {
        let body = ByteStream::from_path(bundle.path()).await.map_err(|e| {
            BstalkError::Artifact(ArtifactError::ReadFailed {
                path: bundle.path().to_path_buf(),
                message: e.to_string(),
            })
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type("application/zip")
            .send()
            .await
            .map_err(|e| {
                BstalkError::Artifact(ArtifactError::upload(
                    &self.bucket,
                    key,
                    format!("S3 put error: {}", e.into_service_error()),
                ))
            })?;

        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn upload(&self, bundle: &ArtifactBundle) -> Result<BundleLocation> {
        let key = bundle.object_key(self.prefix.as_deref());

        if self.object_exists(&key).await? {
            debug!(
                "Bundle already present at s3://{}/{key}, skipping upload",
                self.bucket
            );
        } else {
            info!(
                "Uploading bundle {} ({} bytes) to s3://{}/{key}",
                bundle.path().display(),
                bundle.size_bytes(),
                self.bucket
            );
            self.put_bundle(bundle, &key).await?;
        }

        Ok(BundleLocation::new(&self.bucket, key))
    }

    fn backend_type(&self) -> &'static str {
        "s3"
    }
}
