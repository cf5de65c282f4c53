//! Typed resource descriptors.
//!
//! Each descriptor lowers to a [`ResourceNode`], the generic shape the
//! change-management format expects: a resource type, optional explicit
//! ordering dependencies, and a property bag. Cross-references between
//! resources in the same template use [`LogicalRef`].

use serde::Serialize;

use crate::artifact::BundleLocation;
use crate::error::ManifestError;

use super::options::OptionSettings;

/// Resource type for a logical application container.
pub const TYPE_APPLICATION: &str = "AWS::ElasticBeanstalk::Application";

/// Resource type for a deployable application version.
pub const TYPE_APPLICATION_VERSION: &str = "AWS::ElasticBeanstalk::ApplicationVersion";

/// Resource type for a compute identity role.
pub const TYPE_ROLE: &str = "AWS::IAM::Role";

/// Resource type for an instance profile.
pub const TYPE_INSTANCE_PROFILE: &str = "AWS::IAM::InstanceProfile";

/// Resource type for a running environment.
pub const TYPE_ENVIRONMENT: &str = "AWS::ElasticBeanstalk::Environment";

/// Service principal allowed to assume the compute role.
pub const EC2_SERVICE_PRINCIPAL: &str = "ec2.amazonaws.com";

/// A reference to another resource in the same template by logical id.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LogicalRef {
    /// Logical id of the referenced resource.
    #[serde(rename = "Ref")]
    pub logical_id: String,
}

impl LogicalRef {
    /// Creates a reference to the given logical id.
    #[must_use]
    pub fn to(logical_id: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
        }
    }
}

/// A lowered resource: type, ordering dependencies, and properties.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResourceNode {
    /// Resource type identifier.
    #[serde(rename = "Type")]
    pub resource_type: String,
    /// Logical ids this resource must be realized after.
    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Resource properties.
    #[serde(rename = "Properties")]
    pub properties: serde_json::Value,
}

impl ResourceNode {
    fn new<P: Serialize>(
        resource_type: &str,
        depends_on: Vec<String>,
        properties: &P,
    ) -> Result<Self, ManifestError> {
        let properties = serde_json::to_value(properties).map_err(|e| {
            ManifestError::SerializationFailed {
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            resource_type: resource_type.to_string(),
            depends_on,
            properties,
        })
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// A named logical application container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDescriptor {
    /// Logical id within the template.
    pub logical_id: String,
    /// Application name.
    pub application_name: String,
    /// Optional description.
    pub description: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ApplicationProperties<'a> {
    application_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl ApplicationDescriptor {
    /// Declares an application.
    ///
    /// # Errors
    ///
    /// Returns an error if the application name is empty.
    pub fn new(
        logical_id: impl Into<String>,
        application_name: impl Into<String>,
    ) -> Result<Self, ManifestError> {
        let application_name = application_name.into();
        if application_name.is_empty() {
            return Err(ManifestError::EmptyApplicationName);
        }

        Ok(Self {
            logical_id: logical_id.into(),
            application_name,
            description: None,
        })
    }

    /// Sets the application description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Lowers the descriptor to a resource node.
    ///
    /// # Errors
    ///
    /// Returns an error if property serialization fails.
    pub fn to_node(&self) -> Result<ResourceNode, ManifestError> {
        ResourceNode::new(
            TYPE_APPLICATION,
            vec![],
            &ApplicationProperties {
                application_name: &self.application_name,
                description: self.description.as_deref(),
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Application version
// ---------------------------------------------------------------------------

/// One immutable, deployable build of the application.
///
/// The constructor records the explicit ordering dependency on the
/// application descriptor; the provisioning engine does not reliably infer
/// it from the name reference alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationVersionDescriptor {
    /// Logical id within the template.
    pub logical_id: String,
    /// Name of the application this version belongs to.
    pub application_name: String,
    /// Remote location of the deployment bundle.
    pub source_bundle: BundleLocation,
    /// Logical ids this version must be realized after.
    pub depends_on: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SourceBundleProperties<'a> {
    s3_bucket: &'a str,
    s3_key: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ApplicationVersionProperties<'a> {
    application_name: &'a str,
    source_bundle: SourceBundleProperties<'a>,
}

impl ApplicationVersionDescriptor {
    /// Declares a version of the given application, depending on it.
    #[must_use]
    pub fn new(
        logical_id: impl Into<String>,
        application: &ApplicationDescriptor,
        source_bundle: BundleLocation,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            application_name: application.application_name.clone(),
            source_bundle,
            depends_on: vec![application.logical_id.clone()],
        }
    }

    /// Lowers the descriptor to a resource node.
    ///
    /// # Errors
    ///
    /// Returns an error if property serialization fails.
    pub fn to_node(&self) -> Result<ResourceNode, ManifestError> {
        ResourceNode::new(
            TYPE_APPLICATION_VERSION,
            self.depends_on.clone(),
            &ApplicationVersionProperties {
                application_name: &self.application_name,
                source_bundle: SourceBundleProperties {
                    s3_bucket: &self.source_bundle.bucket,
                    s3_key: &self.source_bundle.key,
                },
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A compute identity: a role assumable by the compute service, carrying
/// one managed policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDescriptor {
    /// Logical id within the template.
    pub logical_id: String,
    /// Service principal allowed to assume the role.
    pub service_principal: String,
    /// Managed policy ARNs attached to the role.
    pub managed_policy_arns: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleStatement<'a> {
    effect: &'static str,
    principal: ServicePrincipal<'a>,
    action: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ServicePrincipal<'a> {
    service: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRolePolicyDocument<'a> {
    version: &'static str,
    statement: Vec<AssumeRoleStatement<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RoleProperties<'a> {
    assume_role_policy_document: AssumeRolePolicyDocument<'a>,
    managed_policy_arns: &'a [String],
}

impl RoleDescriptor {
    /// Declares a role trusted by the EC2 service with one managed policy.
    #[must_use]
    pub fn web_tier(logical_id: impl Into<String>, managed_policy_arn: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            service_principal: EC2_SERVICE_PRINCIPAL.to_string(),
            managed_policy_arns: vec![managed_policy_arn.into()],
        }
    }

    /// Lowers the descriptor to a resource node.
    ///
    /// # Errors
    ///
    /// Returns an error if property serialization fails.
    pub fn to_node(&self) -> Result<ResourceNode, ManifestError> {
        ResourceNode::new(
            TYPE_ROLE,
            vec![],
            &RoleProperties {
                assume_role_policy_document: AssumeRolePolicyDocument {
                    version: "2012-10-17",
                    statement: vec![AssumeRoleStatement {
                        effect: "Allow",
                        principal: ServicePrincipal {
                            service: &self.service_principal,
                        },
                        action: "sts:AssumeRole",
                    }],
                },
                managed_policy_arns: &self.managed_policy_arns,
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Instance profile
// ---------------------------------------------------------------------------

/// A named wrapper letting compute instances assume a role at boot.
///
/// The constructor takes exactly one role reference: an instance profile in
/// this manifest always wraps exactly the role declared alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceProfileDescriptor {
    /// Logical id within the template.
    pub logical_id: String,
    /// Instance profile name.
    pub instance_profile_name: String,
    /// References to the wrapped roles (always exactly one).
    pub roles: Vec<LogicalRef>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceProfileProperties<'a> {
    instance_profile_name: &'a str,
    roles: &'a [LogicalRef],
}

impl InstanceProfileDescriptor {
    /// Declares an instance profile wrapping the given role.
    #[must_use]
    pub fn new(
        logical_id: impl Into<String>,
        instance_profile_name: impl Into<String>,
        role: &RoleDescriptor,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            instance_profile_name: instance_profile_name.into(),
            roles: vec![LogicalRef::to(role.logical_id.clone())],
        }
    }

    /// Lowers the descriptor to a resource node.
    ///
    /// # Errors
    ///
    /// Returns an error if property serialization fails.
    pub fn to_node(&self) -> Result<ResourceNode, ManifestError> {
        ResourceNode::new(
            TYPE_INSTANCE_PROFILE,
            vec![],
            &InstanceProfileProperties {
                instance_profile_name: &self.instance_profile_name,
                roles: &self.roles,
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// The running deployment target. Creating or updating it is what triggers
/// the actual deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDescriptor {
    /// Logical id within the template.
    pub logical_id: String,
    /// Environment name.
    pub environment_name: String,
    /// Name of the application this environment runs.
    pub application_name: String,
    /// Platform stack identifier.
    pub solution_stack_name: String,
    /// Environment option settings.
    pub option_settings: OptionSettings,
    /// Reference to the application version to activate.
    pub version_label: LogicalRef,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EnvironmentProperties<'a> {
    environment_name: &'a str,
    application_name: &'a str,
    solution_stack_name: &'a str,
    option_settings: &'a OptionSettings,
    version_label: &'a LogicalRef,
}

impl EnvironmentDescriptor {
    /// Declares an environment running the given application version.
    #[must_use]
    pub fn new(
        logical_id: impl Into<String>,
        environment_name: impl Into<String>,
        application: &ApplicationDescriptor,
        solution_stack_name: impl Into<String>,
        option_settings: OptionSettings,
        version: &ApplicationVersionDescriptor,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            environment_name: environment_name.into(),
            application_name: application.application_name.clone(),
            solution_stack_name: solution_stack_name.into(),
            option_settings,
            version_label: LogicalRef::to(version.logical_id.clone()),
        }
    }

    /// Lowers the descriptor to a resource node.
    ///
    /// # Errors
    ///
    /// Returns an error if property serialization fails.
    pub fn to_node(&self) -> Result<ResourceNode, ManifestError> {
        ResourceNode::new(
            TYPE_ENVIRONMENT,
            vec![],
            &EnvironmentProperties {
                environment_name: &self.environment_name,
                application_name: &self.application_name,
                solution_stack_name: &self.solution_stack_name,
                option_settings: &self.option_settings,
                version_label: &self.version_label,
            },
        )
    }
}
