//! Provisioning engine integration.
//!
//! This module submits assembled manifests to AWS CloudFormation and reads
//! back stack status. The engine is treated as an opaque dependency: its
//! errors pass through unchanged.

mod stack;

pub use stack::{StackEngine, StackOutcome, StackSummary};
