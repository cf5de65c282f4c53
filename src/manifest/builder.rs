//! Deployment manifest assembly.
//!
//! The builder constructs the five descriptor groups in dependency order,
//! leaves first: artifact reference in, application, version, identity, and
//! finally the environment that ties them together. Assembly is a single
//! synchronous pass with no runtime feedback; everything the provisioning
//! engine needs is known up front.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::artifact::BundleLocation;
use crate::config::DeployConfig;
use crate::error::{ManifestError, Result};

use super::options::{
    NS_AUTOSCALING_GROUP, NS_EC2_INSTANCES, NS_LAUNCH_CONFIGURATION, OPT_IAM_INSTANCE_PROFILE,
    OPT_INSTANCE_TYPES, OPT_MAX_SIZE, OPT_MIN_SIZE, OptionSetting, OptionSettings,
};
use super::resources::{
    ApplicationDescriptor, ApplicationVersionDescriptor, EnvironmentDescriptor,
    InstanceProfileDescriptor, RoleDescriptor,
};
use super::template::Template;

/// Logical id of the application resource.
pub const ID_APPLICATION: &str = "Application";

/// Logical id of the application version resource.
pub const ID_APP_VERSION: &str = "AppVersion";

/// Logical id of the compute role resource.
pub const ID_WEB_TIER_ROLE: &str = "WebTierRole";

/// Logical id of the instance profile resource.
pub const ID_INSTANCE_PROFILE: &str = "InstanceProfile";

/// Logical id of the environment resource.
pub const ID_ENVIRONMENT: &str = "Environment";

/// A fully assembled deployment manifest, ready for submission.
#[derive(Debug, Clone)]
pub struct DeploymentManifest {
    /// Stack name the manifest is submitted under.
    pub stack_name: String,
    /// Application name.
    pub application_name: String,
    /// Environment name.
    pub environment_name: String,
    /// Remote location of the deployment bundle.
    pub bundle: BundleLocation,
    /// When the manifest was assembled.
    pub created_at: DateTime<Utc>,
    /// The lowered template.
    pub template: Template,
}

/// Assembles deployment manifests from a configuration.
#[derive(Debug)]
pub struct ManifestBuilder<'a> {
    config: &'a DeployConfig,
}

impl<'a> ManifestBuilder<'a> {
    /// Creates a builder over the given configuration.
    #[must_use]
    pub const fn new(config: &'a DeployConfig) -> Self {
        Self { config }
    }

    /// Assembles the manifest for a bundle already placed (or about to be
    /// placed) at the given remote location.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration violates a manifest invariant:
    /// empty application name, inverted scaling bounds, or duplicate option
    /// settings.
    pub fn build(&self, bundle: &BundleLocation) -> Result<DeploymentManifest> {
        let config = self.config;

        // Leaves first: the application container everything else hangs off.
        let mut application =
            ApplicationDescriptor::new(ID_APPLICATION, &config.application.name)?;
        if let Some(description) = &config.application.description {
            application = application.with_description(description);
        }

        // The version binds the uploaded bundle to the application, with the
        // ordering edge recorded by its constructor.
        let version =
            ApplicationVersionDescriptor::new(ID_APP_VERSION, &application, bundle.clone());

        // Compute identity: one role, one profile wrapping exactly that role.
        let role = RoleDescriptor::web_tier(ID_WEB_TIER_ROLE, config.managed_policy_arn());
        let profile_name = config.instance_profile_name();
        let profile = InstanceProfileDescriptor::new(ID_INSTANCE_PROFILE, &profile_name, &role);

        let options = Self::build_options(config, &profile)?;

        let environment = EnvironmentDescriptor::new(
            ID_ENVIRONMENT,
            config.environment_name(),
            &application,
            &config.platform.solution_stack,
            options,
            &version,
        );

        let mut template = Template::new().with_description(format!(
            "Deployment of {} via bstalk",
            config.application.name
        ));
        template.add_resource(ID_APPLICATION, application.to_node()?)?;
        template.add_resource(ID_APP_VERSION, version.to_node()?)?;
        template.add_resource(ID_WEB_TIER_ROLE, role.to_node()?)?;
        template.add_resource(ID_INSTANCE_PROFILE, profile.to_node()?)?;
        template.add_resource(ID_ENVIRONMENT, environment.to_node()?)?;

        debug!(
            "Assembled manifest for '{}' with {} resources",
            config.application.name,
            template.len()
        );

        Ok(DeploymentManifest {
            stack_name: config.stack_name(),
            application_name: config.application.name.clone(),
            environment_name: environment.environment_name,
            bundle: bundle.clone(),
            created_at: Utc::now(),
            template,
        })
    }

    /// Builds the environment option settings: the four settings bstalk
    /// manages, then any user-supplied extras.
    fn build_options(
        config: &DeployConfig,
        profile: &InstanceProfileDescriptor,
    ) -> Result<OptionSettings> {
        let scaling = &config.scaling;

        if scaling.min_instances > scaling.max_instances {
            return Err(ManifestError::InvalidScalingBounds {
                min: scaling.min_instances,
                max: scaling.max_instances,
            }
            .into());
        }

        let mut options = OptionSettings::new();

        options.insert(OptionSetting::new(
            NS_LAUNCH_CONFIGURATION,
            OPT_IAM_INSTANCE_PROFILE,
            &profile.instance_profile_name,
        ))?;
        options.insert(OptionSetting::new(
            NS_AUTOSCALING_GROUP,
            OPT_MIN_SIZE,
            scaling.min_instances.to_string(),
        ))?;
        options.insert(OptionSetting::new(
            NS_AUTOSCALING_GROUP,
            OPT_MAX_SIZE,
            scaling.max_instances.to_string(),
        ))?;
        options.insert(OptionSetting::new(
            NS_EC2_INSTANCES,
            OPT_INSTANCE_TYPES,
            &scaling.instance_types,
        ))?;

        for extra in &config.options {
            options.insert(OptionSetting::new(
                &extra.namespace,
                &extra.option_name,
                &extra.value,
            ))?;
        }

        Ok(options)
    }
}

impl DeploymentManifest {
    /// Returns the number of resources in the manifest.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.template.len()
    }
}

impl std::fmt::Display for DeploymentManifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Deployment manifest '{}' ({} resources):",
            self.stack_name,
            self.template.len()
        )?;
        for (logical_id, node) in self.template.iter() {
            write!(f, "  {logical_id} ({})", node.resource_type)?;
            if node.depends_on.is_empty() {
                writeln!(f)?;
            } else {
                writeln!(f, " after {}", node.depends_on.join(", "))?;
            }
        }
        write!(f, "  bundle: {}", self.bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ApplicationConfig, ArtifactConfig, DeployConfig, IdentityConfig, OptionOverride,
        PlatformConfig, ScalingConfig, StackConfig,
    };
    use std::path::PathBuf;

    fn default_config() -> DeployConfig {
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

    fn bundle() -> BundleLocation {
        BundleLocation::new("deploy-bundles", "0d6fa1e2.zip")
    }

    #[test]
    fn test_default_manifest_end_to_end() {
        let config = default_config();
        let manifest = ManifestBuilder::new(&config).build(&bundle()).unwrap();

        assert_eq!(manifest.stack_name, "MyWebApp-deploy");
        assert_eq!(manifest.application_name, "MyWebApp");
        assert_eq!(manifest.environment_name, "MyWebAppEnvironment");
        assert_eq!(manifest.resource_count(), 5);

        let json: serde_json::Value =
            serde_json::from_str(&manifest.template.to_json().unwrap()).unwrap();
        let resources = &json["Resources"];

        // One application named MyWebApp.
        assert_eq!(
            resources[ID_APPLICATION]["Properties"]["ApplicationName"],
            "MyWebApp"
        );

        // One version referencing that application and the uploaded bundle,
        // declared after the application.
        let version = &resources[ID_APP_VERSION];
        assert_eq!(version["Properties"]["ApplicationName"], "MyWebApp");
        assert_eq!(version["DependsOn"][0], ID_APPLICATION);
        assert_eq!(
            version["Properties"]["SourceBundle"]["S3Bucket"],
            "deploy-bundles"
        );
        assert_eq!(
            version["Properties"]["SourceBundle"]["S3Key"],
            "0d6fa1e2.zip"
        );

        // One role trusted by EC2 with the web tier policy.
        let role = &resources[ID_WEB_TIER_ROLE];
        assert_eq!(
            role["Properties"]["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]
                ["Service"],
            "ec2.amazonaws.com"
        );
        assert_eq!(
            role["Properties"]["ManagedPolicyArns"][0],
            "arn:aws:iam::aws:policy/AWSElasticBeanstalkWebTier"
        );

        // One instance profile wrapping exactly that role.
        let profile = &resources[ID_INSTANCE_PROFILE];
        assert_eq!(
            profile["Properties"]["InstanceProfileName"],
            "MyWebApp-InstanceProfile"
        );
        assert_eq!(
            profile["Properties"]["Roles"].as_array().unwrap().len(),
            1
        );
        assert_eq!(profile["Properties"]["Roles"][0]["Ref"], ID_WEB_TIER_ROLE);

        // One environment with the expected option settings and version ref.
        let environment = &resources[ID_ENVIRONMENT];
        assert_eq!(
            environment["Properties"]["EnvironmentName"],
            "MyWebAppEnvironment"
        );
        assert_eq!(environment["Properties"]["ApplicationName"], "MyWebApp");
        assert_eq!(environment["Properties"]["VersionLabel"]["Ref"], ID_APP_VERSION);
    }

    #[test]
    fn test_default_option_settings() {
        let config = default_config();
        let manifest = ManifestBuilder::new(&config).build(&bundle()).unwrap();

        let node = manifest.template.get(ID_ENVIRONMENT).unwrap();
        let settings = node.properties["OptionSettings"].as_array().unwrap();
        assert_eq!(settings.len(), 4);

        let find = |namespace: &str, name: &str| -> String {
            settings
                .iter()
                .find(|s| s["Namespace"] == namespace && s["OptionName"] == name)
                .map(|s| s["Value"].as_str().unwrap().to_string())
                .unwrap()
        };

        assert_eq!(
            find(NS_LAUNCH_CONFIGURATION, OPT_IAM_INSTANCE_PROFILE),
            "MyWebApp-InstanceProfile"
        );
        assert_eq!(find(NS_AUTOSCALING_GROUP, OPT_MIN_SIZE), "1");
        assert_eq!(find(NS_AUTOSCALING_GROUP, OPT_MAX_SIZE), "1");
        assert_eq!(find(NS_EC2_INSTANCES, OPT_INSTANCE_TYPES), "t2.micro");

        // Min <= Max as integers.
        let min: u32 = find(NS_AUTOSCALING_GROUP, OPT_MIN_SIZE).parse().unwrap();
        let max: u32 = find(NS_AUTOSCALING_GROUP, OPT_MAX_SIZE).parse().unwrap();
        assert!(min <= max);
    }

    #[test]
    fn test_profile_option_matches_profile_resource() {
        let mut config = default_config();
        config.identity.profile_name = Some(String::from("custom-profile"));

        let manifest = ManifestBuilder::new(&config).build(&bundle()).unwrap();

        let profile = manifest.template.get(ID_INSTANCE_PROFILE).unwrap();
        let environment = manifest.template.get(ID_ENVIRONMENT).unwrap();

        let option_value = environment.properties["OptionSettings"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["OptionName"] == OPT_IAM_INSTANCE_PROFILE)
            .map(|s| s["Value"].clone())
            .unwrap();

        assert_eq!(option_value, profile.properties["InstanceProfileName"]);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = default_config();
        config.scaling.min_instances = 4;
        config.scaling.max_instances = 2;

        let result = ManifestBuilder::new(&config).build(&bundle());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_application_name_rejected() {
        let mut config = default_config();
        config.application.name = String::new();

        let result = ManifestBuilder::new(&config).build(&bundle());
        assert!(result.is_err());
    }

    #[test]
    fn test_extra_options_merged() {
        let mut config = default_config();
        config.options = vec![OptionOverride {
            namespace: String::from("aws:elasticbeanstalk:application:environment"),
            option_name: String::from("LOG_LEVEL"),
            value: String::from("info"),
        }];

        let manifest = ManifestBuilder::new(&config).build(&bundle()).unwrap();
        let node = manifest.template.get(ID_ENVIRONMENT).unwrap();
        let settings = node.properties["OptionSettings"].as_array().unwrap();
        assert_eq!(settings.len(), 5);
    }

    #[test]
    fn test_extra_option_colliding_with_managed_one_rejected() {
        let mut config = default_config();
        config.options = vec![OptionOverride {
            namespace: String::from(NS_AUTOSCALING_GROUP),
            option_name: String::from(OPT_MIN_SIZE),
            value: String::from("9"),
        }];

        let result = ManifestBuilder::new(&config).build(&bundle());
        assert!(result.is_err());
    }

    #[test]
    fn test_referential_consistency_for_any_name() {
        for name in ["MyWebApp", "storefront", "a", "Billing-Api"] {
            let mut config = default_config();
            config.application.name = String::from(name);

            let manifest = ManifestBuilder::new(&config).build(&bundle()).unwrap();
            let json: serde_json::Value =
                serde_json::from_str(&manifest.template.to_json().unwrap()).unwrap();

            assert_eq!(
                json["Resources"][ID_APP_VERSION]["Properties"]["ApplicationName"],
                json["Resources"][ID_APPLICATION]["Properties"]["ApplicationName"]
            );
        }
    }
}
