//! Configuration specification types for the deployment tool.
//!
//! This module defines all the structs that map to the `bstalk.deploy.yaml`
//! file. Every knob the manifest builder consumes lives here; the defaults
//! reproduce a single-instance `t2.micro` web tier on the Amazon Linux 2
//! Node.js 14 stack.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for a bstalk deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployConfig {
    /// Application-level configuration.
    pub application: ApplicationConfig,
    /// Deployment bundle and artifact store configuration.
    pub artifact: ArtifactConfig,
    /// Platform stack configuration.
    #[serde(default)]
    pub platform: PlatformConfig,
    /// Instance scaling and sizing configuration.
    #[serde(default)]
    pub scaling: ScalingConfig,
    /// Compute identity configuration.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Extra environment option settings beyond the ones bstalk emits.
    #[serde(default)]
    pub options: Vec<OptionOverride>,
    /// Stack naming and region configuration.
    #[serde(default)]
    pub stack: StackConfig,
}

/// Application-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationConfig {
    /// Logical application name (e.g. "MyWebApp").
    pub name: String,
    /// Environment name. Defaults to `{name}Environment`.
    #[serde(default)]
    pub environment: Option<String>,
    /// Optional application description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Deployment bundle and artifact store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactConfig {
    /// Local path to the packaged application bundle.
    #[serde(default = "default_bundle_path")]
    pub path: PathBuf,
    /// S3 bucket the bundle is uploaded to.
    pub bucket: String,
    /// Optional key prefix within the bucket.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Optional S3 region (uses the AWS default chain if not set).
    #[serde(default)]
    pub region: Option<String>,
}

/// Platform stack configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Solution stack identifier naming the platform and runtime version.
    #[serde(default = "default_solution_stack")]
    pub solution_stack: String,
}

/// Instance scaling and sizing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScalingConfig {
    /// Minimum number of instances.
    #[serde(default = "default_instance_count")]
    pub min_instances: u32,
    /// Maximum number of instances.
    #[serde(default = "default_instance_count")]
    pub max_instances: u32,
    /// EC2 instance type(s), comma separated.
    #[serde(default = "default_instance_types")]
    pub instance_types: String,
}

/// Compute identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityConfig {
    /// AWS managed policy attached to the instance role.
    #[serde(default = "default_policy_name")]
    pub policy_name: String,
    /// Instance profile name. Defaults to `{name}-InstanceProfile`.
    #[serde(default)]
    pub profile_name: Option<String>,
}

/// One extra namespaced option setting supplied by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionOverride {
    /// Option namespace (e.g. "aws:elasticbeanstalk:application:environment").
    pub namespace: String,
    /// Option name within the namespace.
    pub option_name: String,
    /// Option value.
    pub value: String,
}

/// Stack naming and region configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StackConfig {
    /// CloudFormation stack name. Defaults to `{name}-deploy`.
    #[serde(default)]
    pub name: Option<String>,
    /// Stack region (uses the AWS default chain if not set).
    #[serde(default)]
    pub region: Option<String>,
}

// Default value functions

fn default_bundle_path() -> PathBuf {
    PathBuf::from("./app.zip")
}

fn default_solution_stack() -> String {
    String::from("64bit Amazon Linux 2 v5.4.4 running Node.js 14")
}

const fn default_instance_count() -> u32 {
    1
}

fn default_instance_types() -> String {
    String::from("t2.micro")
}

fn default_policy_name() -> String {
    String::from("AWSElasticBeanstalkWebTier")
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            solution_stack: default_solution_stack(),
        }
    }
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            min_instances: default_instance_count(),
            max_instances: default_instance_count(),
            instance_types: default_instance_types(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            policy_name: default_policy_name(),
            profile_name: None,
        }
    }
}

impl DeployConfig {
    /// Returns the environment name, derived from the application name when
    /// not set explicitly.
    #[must_use]
    pub fn environment_name(&self) -> String {
        self.application.environment.clone().unwrap_or_else(|| {
            format!("{}Environment", self.application.name)
        })
    }

    /// Returns the instance profile name, derived from the application name
    /// when not set explicitly.
    #[must_use]
    pub fn instance_profile_name(&self) -> String {
        self.identity.profile_name.clone().unwrap_or_else(|| {
            format!("{}-InstanceProfile", self.application.name)
        })
    }

    /// Returns the CloudFormation stack name, derived from the application
    /// name when not set explicitly.
    #[must_use]
    pub fn stack_name(&self) -> String {
        self.stack
            .name
            .clone()
            .unwrap_or_else(|| format!("{}-deploy", self.application.name))
    }

    /// Returns the ARN of the managed policy attached to the instance role.
    #[must_use]
    pub fn managed_policy_arn(&self) -> String {
        format!("arn:aws:iam::aws:policy/{}", self.identity.policy_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> DeployConfig {
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
    fn test_derived_names() {
        let config = minimal_config();
        assert_eq!(config.environment_name(), "MyWebAppEnvironment");
        assert_eq!(config.instance_profile_name(), "MyWebApp-InstanceProfile");
        assert_eq!(config.stack_name(), "MyWebApp-deploy");
    }

    #[test]
    fn test_explicit_names_win() {
        let mut config = minimal_config();
        config.application.environment = Some(String::from("prod-env"));
        config.identity.profile_name = Some(String::from("custom-profile"));
        config.stack.name = Some(String::from("custom-stack"));

        assert_eq!(config.environment_name(), "prod-env");
        assert_eq!(config.instance_profile_name(), "custom-profile");
        assert_eq!(config.stack_name(), "custom-stack");
    }

    #[test]
    fn test_defaults_single_instance_web_tier() {
        let config = minimal_config();
        assert_eq!(config.scaling.min_instances, 1);
        assert_eq!(config.scaling.max_instances, 1);
        assert_eq!(config.scaling.instance_types, "t2.micro");
        assert_eq!(
            config.platform.solution_stack,
            "64bit Amazon Linux 2 v5.4.4 running Node.js 14"
        );
        assert_eq!(
            config.managed_policy_arn(),
            "arn:aws:iam::aws:policy/AWSElasticBeanstalkWebTier"
        );
    }
}
