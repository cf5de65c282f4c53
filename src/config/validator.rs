//! Configuration validation for deployment configs.
//!
//! This module validates a deployment configuration before any descriptor is
//! assembled, so that what reaches the manifest builder is already coherent.
//! Problems the provisioning engine would reject anyway (name collisions,
//! unknown solution stacks) are left to the engine.

use crate::error::{BstalkError, ConfigError, Result};
use crate::manifest::RESERVED_OPTIONS;
use std::collections::HashSet;
use tracing::debug;

use super::spec::{ApplicationConfig, ArtifactConfig, DeployConfig, OptionOverride, ScalingConfig};

/// Bundle extensions the platform understands.
const BUNDLE_EXTENSIONS: &[&str] = &["zip", "war", "jar"];

/// Validator for deployment configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a deployment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self, config: &DeployConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_application(&config.application, &mut result);
        Self::validate_artifact(&config.artifact, &mut result);
        Self::validate_platform(config, &mut result);
        Self::validate_scaling(&config.scaling, &mut result);
        Self::validate_identity(config, &mut result);
        Self::validate_options(&config.options, &mut result);

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(BstalkError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        }
    }

    /// Validates application configuration.
    fn validate_application(application: &ApplicationConfig, result: &mut ValidationResult) {
        if application.name.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("application.name"),
                message: String::from("Application name cannot be empty"),
            });
        } else if !is_valid_name(&application.name) {
            result.errors.push(ValidationError {
                field: String::from("application.name"),
                message: format!(
                    "Application name '{}' is invalid. Must be alphanumeric with hyphens.",
                    application.name
                ),
            });
        }

        if let Some(environment) = &application.environment
            && environment.is_empty()
        {
            result.errors.push(ValidationError {
                field: String::from("application.environment"),
                message: String::from("Environment name cannot be empty when set"),
            });
        }
    }

    /// Validates artifact configuration.
    fn validate_artifact(artifact: &ArtifactConfig, result: &mut ValidationResult) {
        if artifact.bucket.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("artifact.bucket"),
                message: String::from("Artifact bucket name is required"),
            });
        }

        if artifact.path.as_os_str().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("artifact.path"),
                message: String::from("Bundle path cannot be empty"),
            });
            return;
        }

        let known_extension = artifact
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| BUNDLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()));

        if !known_extension {
            result.warnings.push(format!(
                "artifact.path: '{}' does not look like a deployable archive (expected {})",
                artifact.path.display(),
                BUNDLE_EXTENSIONS.join(", ")
            ));
        }
    }

    /// Validates platform configuration.
    fn validate_platform(config: &DeployConfig, result: &mut ValidationResult) {
        let stack = &config.platform.solution_stack;

        if stack.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("platform.solution_stack"),
                message: String::from("Solution stack identifier cannot be empty"),
            });
        } else if !stack.contains("running") {
            result.warnings.push(format!(
                "platform.solution_stack: '{stack}' does not look like a solution stack \
                 identifier. The provisioning engine will reject unknown stacks."
            ));
        }
    }

    /// Validates scaling configuration.
    fn validate_scaling(scaling: &ScalingConfig, result: &mut ValidationResult) {
        if scaling.min_instances == 0 {
            result.errors.push(ValidationError {
                field: String::from("scaling.min_instances"),
                message: String::from("Minimum instance count must be at least 1"),
            });
        }

        if scaling.min_instances > scaling.max_instances {
            result.errors.push(ValidationError {
                field: String::from("scaling.max_instances"),
                message: format!(
                    "min_instances ({}) exceeds max_instances ({})",
                    scaling.min_instances, scaling.max_instances
                ),
            });
        }

        if scaling.instance_types.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("scaling.instance_types"),
                message: String::from("Instance types cannot be empty"),
            });
        }
    }

    /// Validates identity configuration.
    fn validate_identity(config: &DeployConfig, result: &mut ValidationResult) {
        let identity = &config.identity;

        if identity.policy_name.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("identity.policy_name"),
                message: String::from("Managed policy name cannot be empty"),
            });
        } else if identity.policy_name.starts_with("arn:") {
            result.warnings.push(String::from(
                "identity.policy_name: expected a bare policy name, not an ARN; \
                 the ARN prefix is added automatically",
            ));
        }

        if let Some(profile_name) = &identity.profile_name
            && profile_name.is_empty()
        {
            result.errors.push(ValidationError {
                field: String::from("identity.profile_name"),
                message: String::from("Instance profile name cannot be empty when set"),
            });
        }
    }

    /// Validates extra option settings.
    fn validate_options(options: &[OptionOverride], result: &mut ValidationResult) {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();

        for (i, option) in options.iter().enumerate() {
            let prefix = format!("options[{i}]");

            if option.namespace.is_empty() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.namespace"),
                    message: String::from("Option namespace cannot be empty"),
                });
            }

            if option.option_name.is_empty() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.option_name"),
                    message: String::from("Option name cannot be empty"),
                });
            }

            let pair = (option.namespace.as_str(), option.option_name.as_str());

            if !seen.insert(pair) {
                result.errors.push(ValidationError {
                    field: prefix.clone(),
                    message: format!(
                        "Duplicate option setting: {}/{}",
                        option.namespace, option.option_name
                    ),
                });
            }

            if RESERVED_OPTIONS.contains(&pair) {
                result.errors.push(ValidationError {
                    field: prefix,
                    message: format!(
                        "Option {}/{} is managed by bstalk and cannot be overridden here; \
                         use the scaling and identity sections instead",
                        option.namespace, option.option_name
                    ),
                });
            }
        }
    }
}

/// Validates that a name is acceptable as an application identifier.
/// Names must be alphanumeric with hyphens, starting with a letter.
fn is_valid_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    let mut chars = name.chars();

    if let Some(first) = chars.next()
        && !first.is_ascii_alphabetic()
    {
        return false;
    }

    for c in chars {
        if !c.is_ascii_alphanumeric() && c != '-' {
            return false;
        }
    }

    !name.ends_with('-') && !name.contains("--")
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::spec::{
        ApplicationConfig, ArtifactConfig, IdentityConfig, PlatformConfig, StackConfig,
    };
    use std::path::PathBuf;

    fn test_config() -> DeployConfig {
        DeployConfig {
            application: ApplicationConfig {
                name: String::from("MyWebApp"),
                environment: None,
                description: None,
            },
            artifact: ArtifactConfig {
                path: PathBuf::from("./app.zip"),
                bucket: String::from("deploy-bundles"),
                prefix: None,
                region: None,
            },
            platform: PlatformConfig::default(),
            scaling: ScalingConfig::default(),
            identity: IdentityConfig::default(),
            options: vec![],
            stack: StackConfig::default(),
        }
    }

    #[test]
    fn test_valid_defaults_pass() {
        let validator = ConfigValidator::new();
        let result = validator.validate(&test_config());
        assert!(result.is_ok());
        assert!(result.unwrap().is_valid());
    }

    #[test]
    fn test_empty_application_name_fails() {
        let mut config = test_config();
        config.application.name = String::new();

        let validator = ConfigValidator::new();
        assert!(validator.validate(&config).is_err());
    }

    #[test]
    fn test_inverted_scaling_bounds_fail() {
        let mut config = test_config();
        config.scaling.min_instances = 3;
        config.scaling.max_instances = 1;

        let validator = ConfigValidator::new();
        assert!(validator.validate(&config).is_err());
    }

    #[test]
    fn test_zero_min_instances_fails() {
        let mut config = test_config();
        config.scaling.min_instances = 0;

        let validator = ConfigValidator::new();
        assert!(validator.validate(&config).is_err());
    }

    #[test]
    fn test_duplicate_extra_option_fails() {
        let mut config = test_config();
        let option = OptionOverride {
            namespace: String::from("aws:elasticbeanstalk:application:environment"),
            option_name: String::from("LOG_LEVEL"),
            value: String::from("debug"),
        };
        config.options = vec![option.clone(), option];

        let validator = ConfigValidator::new();
        assert!(validator.validate(&config).is_err());
    }

    #[test]
    fn test_reserved_option_collision_fails() {
        let mut config = test_config();
        config.options = vec![OptionOverride {
            namespace: String::from("aws:autoscaling:asg"),
            option_name: String::from("MinSize"),
            value: String::from("5"),
        }];

        let validator = ConfigValidator::new();
        assert!(validator.validate(&config).is_err());
    }

    #[test]
    fn test_non_archive_bundle_warns() {
        let mut config = test_config();
        config.artifact.path = PathBuf::from("./app.tar.gz");

        let validator = ConfigValidator::new();
        let result = validator.validate(&config).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.warning_count(), 1);
    }

    #[test]
    fn test_valid_name() {
        assert!(is_valid_name("MyWebApp"));
        assert!(is_valid_name("my-web-app"));
        assert!(is_valid_name("App2"));
    }

    #[test]
    fn test_invalid_name() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("2fast")); // starts with digit
        assert!(!is_valid_name("my app")); // whitespace
        assert!(!is_valid_name("app-")); // ends with hyphen
        assert!(!is_valid_name("my--app")); // consecutive hyphens
    }
}
