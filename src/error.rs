//! Error types for the bstalk deployment tool.
//!
//! This module provides the error hierarchy for every stage of a deployment:
//! configuration, artifact referencing, manifest assembly, and stack
//! submission. Errors raised by the provisioning engine itself are carried
//! through verbatim, never reinterpreted.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the bstalk deployment tool.
#[derive(Debug, Error)]
pub enum BstalkError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Artifact bundle errors.
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Manifest assembly errors.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Stack submission errors.
    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// Environment variable is missing.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },
}

/// Artifact bundle errors.
///
/// A missing bundle is the only failure this tool can detect locally; it
/// aborts the manifest build before any descriptor is emitted.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The bundle file does not exist.
    #[error("Deployment bundle not found: {path}")]
    BundleNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The bundle path exists but is not a regular file.
    #[error("Deployment bundle is not a file: {path}")]
    NotAFile {
        /// The offending path.
        path: PathBuf,
    },

    /// The bundle could not be read.
    #[error("Failed to read bundle {path}: {message}")]
    ReadFailed {
        /// Path to the bundle.
        path: PathBuf,
        /// Description of the read failure.
        message: String,
    },

    /// The bundle could not be uploaded to the artifact store.
    #[error("Failed to upload bundle to s3://{bucket}/{key}: {message}")]
    UploadFailed {
        /// Target bucket.
        bucket: String,
        /// Target object key.
        key: String,
        /// Description of the upload failure.
        message: String,
    },
}

/// Manifest assembly errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Two option settings share the same (namespace, option name) pair.
    #[error("Duplicate option setting: {namespace}/{option_name}")]
    DuplicateOption {
        /// Option namespace.
        namespace: String,
        /// Option name within the namespace.
        option_name: String,
    },

    /// Two resources share the same logical id.
    #[error("Duplicate logical resource id: {logical_id}")]
    DuplicateLogicalId {
        /// The duplicated logical id.
        logical_id: String,
    },

    /// Scaling bounds are inverted.
    #[error("Invalid scaling bounds: MinSize {min} exceeds MaxSize {max}")]
    InvalidScalingBounds {
        /// Minimum instance count.
        min: u32,
        /// Maximum instance count.
        max: u32,
    },

    /// The application name is empty.
    #[error("Application name cannot be empty")]
    EmptyApplicationName,

    /// Template serialization failed.
    #[error("Failed to serialize template: {message}")]
    SerializationFailed {
        /// Description of the serialization failure.
        message: String,
    },
}

/// Stack submission errors.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The provisioning engine rejected the submission. The engine's message
    /// is passed through unchanged.
    #[error("Provisioning engine error: {message}")]
    EngineRejected {
        /// Verbatim message from the engine.
        message: String,
    },

    /// The submitted template is identical to what the stack already runs.
    #[error("Stack '{stack_name}' is already up to date")]
    NoChanges {
        /// Name of the stack.
        stack_name: String,
    },

    /// The stack does not exist.
    #[error("Stack not found: {stack_name}")]
    StackNotFound {
        /// Name of the missing stack.
        stack_name: String,
    },

    /// The engine returned a response this tool cannot interpret.
    #[error("Invalid response from provisioning engine: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Result type alias for bstalk operations.
pub type Result<T> = std::result::Result<T, BstalkError>;

impl BstalkError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a validation error without a specific field.
    #[must_use]
    pub fn validation_general(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: None,
        }
    }
}

impl ArtifactError {
    /// Creates an upload error for the given location.
    #[must_use]
    pub fn upload(
        bucket: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::UploadFailed {
            bucket: bucket.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}

impl ManifestError {
    /// Creates a duplicate-option error.
    #[must_use]
    pub fn duplicate_option(namespace: impl Into<String>, option_name: impl Into<String>) -> Self {
        Self::DuplicateOption {
            namespace: namespace.into(),
            option_name: option_name.into(),
        }
    }
}

impl SubmitError {
    /// Wraps a verbatim engine message.
    #[must_use]
    pub fn engine(message: impl Into<String>) -> Self {
        Self::EngineRejected {
            message: message.into(),
        }
    }
}
