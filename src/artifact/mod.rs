//! Artifact handling for the bstalk deployment tool.
//!
//! This module references the local deployment bundle, content-addresses it,
//! and uploads it to the remote artifact store. The resulting
//! [`BundleLocation`] is what the Application Version descriptor points at.

mod bundle;
mod store;
mod s3;

pub use bundle::{ArtifactBundle, BundleLocation};
pub use store::ArtifactStore;
pub use s3::S3ArtifactStore;
