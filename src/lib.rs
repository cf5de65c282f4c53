// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Bstalk
//!
//! A declarative deployment tool for AWS Elastic Beanstalk web applications.
//!
//! ## Overview
//!
//! Bstalk turns a small YAML file into a complete, single-submission
//! deployment:
//!
//! - Upload the packaged application bundle to S3 under a content-addressed
//!   key
//! - Declare the application, an immutable application version, the compute
//!   identity (role and instance profile), and the running environment
//! - Compile everything into one CloudFormation template and submit it as a
//!   single stack create or update
//!
//! ## Architecture
//!
//! The deployment is declarative and assembled in a single pass:
//!
//! 1. **Configuration**: Parsed from `bstalk.deploy.yaml` and validated
//! 2. **Artifact**: The local bundle is hashed and uploaded (or found
//!    already uploaded)
//! 3. **Manifest**: Typed descriptors are lowered into one template, with
//!    the version's ordering dependency on the application recorded
//!    explicitly
//! 4. **Submission**: The template is handed to the provisioning engine as
//!    one unit; resource ordering and rollback are its job from there
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing and validation
//! - [`artifact`]: Bundle hashing and S3 upload
//! - [`manifest`]: Resource descriptors and template assembly
//! - [`cfn`]: Stack submission and status
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! application:
//!   name: MyWebApp
//!
//! artifact:
//!   path: ./app.zip
//!   bucket: deploy-bundles
//!
//! scaling:
//!   min_instances: 1
//!   max_instances: 1
//!   instance_types: t2.micro
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod artifact;
pub mod cfn;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;

// ============================================================================
// Re-exports
// ============================================================================

pub use artifact::{ArtifactBundle, ArtifactStore, BundleLocation, S3ArtifactStore};
pub use cfn::{StackEngine, StackOutcome, StackSummary};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{find_config_file, ConfigParser, ConfigValidator, DeployConfig};
pub use error::{BstalkError, Result};
pub use manifest::{DeploymentManifest, ManifestBuilder, OptionSettings, Template};
