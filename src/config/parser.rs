//! Configuration parser for loading deployment configuration files.
//!
//! This module handles loading configuration from YAML files and environment
//! variables, with proper precedence and error handling.

use crate::error::{BstalkError, ConfigError, Result};
use std::path::Path;
use tracing::{debug, info};

use super::spec::DeployConfig;

/// Configuration parser for loading deployment configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<std::path::PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<DeployConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(BstalkError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            BstalkError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<DeployConfig> {
        debug!("Parsing YAML configuration");

        let config: DeployConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            BstalkError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!(
            "Successfully parsed configuration for application: {}",
            config.application.name
        );
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// Environment variables are checked in the format:
    /// `BSTALK_<SECTION>_<KEY>` (e.g., `BSTALK_APPLICATION_NAME`)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<DeployConfig> {
        let mut config = self.load_file(path)?;

        Self::apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(config: &mut DeployConfig) {
        // Application overrides
        if let Ok(name) = std::env::var("BSTALK_APPLICATION_NAME") {
            debug!("Overriding application.name from environment");
            config.application.name = name;
        }

        if let Ok(env_name) = std::env::var("BSTALK_APPLICATION_ENVIRONMENT") {
            debug!("Overriding application.environment from environment");
            config.application.environment = Some(env_name);
        }

        // Artifact overrides
        if let Ok(path) = std::env::var("BSTALK_ARTIFACT_PATH") {
            debug!("Overriding artifact.path from environment");
            config.artifact.path = std::path::PathBuf::from(path);
        }

        if let Ok(bucket) = std::env::var("BSTALK_ARTIFACT_BUCKET") {
            debug!("Overriding artifact.bucket from environment");
            config.artifact.bucket = bucket;
        }

        if let Ok(prefix) = std::env::var("BSTALK_ARTIFACT_PREFIX") {
            debug!("Overriding artifact.prefix from environment");
            config.artifact.prefix = Some(prefix);
        }

        // Stack overrides
        if let Ok(region) = std::env::var("BSTALK_STACK_REGION") {
            debug!("Overriding stack.region from environment");
            config.stack.region = Some(region);
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| std::path::PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                BstalkError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "bstalk.deploy.yaml",
    "bstalk.deploy.yml",
    "deploy.yaml",
    "deploy.yml",
];

/// Finds the configuration file in the current directory or parent directories.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<std::path::PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(BstalkError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r"
application:
  name: MyWebApp
artifact:
  bucket: deploy-bundles
";
        let parser = ConfigParser::new();
        let result = parser.parse_yaml(yaml, None);
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config.application.name, "MyWebApp");
        assert_eq!(config.artifact.bucket, "deploy-bundles");
        // Everything else falls back to the single-instance defaults.
        assert_eq!(config.artifact.path, std::path::PathBuf::from("./app.zip"));
        assert_eq!(config.scaling.min_instances, 1);
        assert_eq!(config.scaling.max_instances, 1);
        assert_eq!(config.identity.policy_name, "AWSElasticBeanstalkWebTier");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
application:
  name: storefront
  environment: storefront-prod
  description: "Public storefront service"

artifact:
  path: ./dist/storefront.zip
  bucket: acme-deploy-bundles
  prefix: storefront/prod

platform:
  solution_stack: "64bit Amazon Linux 2 v5.8.0 running Node.js 18"

scaling:
  min_instances: 2
  max_instances: 4
  instance_types: t3.small

identity:
  policy_name: AWSElasticBeanstalkWebTier

options:
  - namespace: aws:elasticbeanstalk:application:environment
    option_name: LOG_LEVEL
    value: info

stack:
  name: storefront-prod
  region: eu-west-1
"#;
        let parser = ConfigParser::new();
        let result = parser.parse_yaml(yaml, None);
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config.application.name, "storefront");
        assert_eq!(config.environment_name(), "storefront-prod");
        assert_eq!(config.scaling.max_instances, 4);
        assert_eq!(config.options.len(), 1);
        assert_eq!(config.stack_name(), "storefront-prod");
        assert_eq!(config.stack.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_parse_rejects_missing_application() {
        let yaml = r"
artifact:
  bucket: deploy-bundles
";
        let parser = ConfigParser::new();
        assert!(parser.parse_yaml(yaml, None).is_err());
    }
}
