//! Configuration module for the bstalk deployment tool.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `bstalk.deploy.yaml`
//! - Environment variable overrides and `.env` loading
//! - Validation of configuration values before manifest assembly

mod spec;
mod parser;
mod validator;

pub use spec::{
    ApplicationConfig, ArtifactConfig, DeployConfig, IdentityConfig, OptionOverride,
    PlatformConfig, ScalingConfig, StackConfig,
};
pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, find_config_file};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
