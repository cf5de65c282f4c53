//! Manifest assembly for the bstalk deployment tool.
//!
//! This module builds the declarative deployment manifest: five typed
//! resource descriptors (application, application version, role, instance
//! profile, environment) lowered into a single change-management template
//! in the provisioning engine's fixed schema.

mod options;
mod resources;
mod template;
mod builder;

pub use options::{
    NS_AUTOSCALING_GROUP, NS_EC2_INSTANCES, NS_LAUNCH_CONFIGURATION, OPT_IAM_INSTANCE_PROFILE,
    OPT_INSTANCE_TYPES, OPT_MAX_SIZE, OPT_MIN_SIZE, OptionSetting, OptionSettings,
    RESERVED_OPTIONS,
};
pub use resources::{
    ApplicationDescriptor, ApplicationVersionDescriptor, EC2_SERVICE_PRINCIPAL,
    EnvironmentDescriptor, InstanceProfileDescriptor, LogicalRef, ResourceNode, RoleDescriptor,
    TYPE_APPLICATION, TYPE_APPLICATION_VERSION, TYPE_ENVIRONMENT, TYPE_INSTANCE_PROFILE,
    TYPE_ROLE,
};
pub use template::Template;
pub use builder::{
    DeploymentManifest, ID_APP_VERSION, ID_APPLICATION, ID_ENVIRONMENT, ID_INSTANCE_PROFILE,
    ID_WEB_TIER_ROLE, ManifestBuilder,
};
