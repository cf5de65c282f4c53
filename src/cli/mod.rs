//! CLI module for the bstalk deployment tool.
//!
//! This module provides the command-line interface for assembling and
//! submitting Elastic Beanstalk deployments.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
