//! Environment option settings.
//!
//! Option settings are namespaced key/value entries consumed by the
//! provisioning engine to configure an environment. The collection enforces
//! the one hard invariant the engine does not: no duplicate
//! (namespace, option name) pairs within a single environment.

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// Launch configuration namespace (instance profile attachment).
pub const NS_LAUNCH_CONFIGURATION: &str = "aws:autoscaling:launchconfiguration";

/// Auto scaling group namespace (scaling bounds).
pub const NS_AUTOSCALING_GROUP: &str = "aws:autoscaling:asg";

/// EC2 instances namespace (instance sizing).
pub const NS_EC2_INSTANCES: &str = "aws:ec2:instances";

/// Option name for the instance profile attachment.
pub const OPT_IAM_INSTANCE_PROFILE: &str = "IamInstanceProfile";

/// Option name for the minimum instance count.
pub const OPT_MIN_SIZE: &str = "MinSize";

/// Option name for the maximum instance count.
pub const OPT_MAX_SIZE: &str = "MaxSize";

/// Option name for the instance type list.
pub const OPT_INSTANCE_TYPES: &str = "InstanceTypes";

/// Option settings bstalk derives from dedicated config sections. User
/// supplied extras may not collide with these.
pub const RESERVED_OPTIONS: &[(&str, &str)] = &[
    (NS_LAUNCH_CONFIGURATION, OPT_IAM_INSTANCE_PROFILE),
    (NS_AUTOSCALING_GROUP, OPT_MIN_SIZE),
    (NS_AUTOSCALING_GROUP, OPT_MAX_SIZE),
    (NS_EC2_INSTANCES, OPT_INSTANCE_TYPES),
];

/// One namespaced option setting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct OptionSetting {
    /// Option namespace.
    pub namespace: String,
    /// Option name within the namespace.
    pub option_name: String,
    /// Option value.
    pub value: String,
}

impl OptionSetting {
    /// Creates a new option setting.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        option_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            option_name: option_name.into(),
            value: value.into(),
        }
    }
}

/// A duplicate-free collection of option settings.
///
/// Insertion order is preserved for readable templates, although the
/// provisioning engine does not care about ordering.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct OptionSettings {
    settings: Vec<OptionSetting>,
}

impl OptionSettings {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { settings: vec![] }
    }

    /// Inserts an option setting.
    ///
    /// # Errors
    ///
    /// Returns an error if a setting with the same (namespace, option name)
    /// pair is already present.
    pub fn insert(&mut self, setting: OptionSetting) -> Result<(), ManifestError> {
        if self.contains(&setting.namespace, &setting.option_name) {
            return Err(ManifestError::duplicate_option(
                setting.namespace,
                setting.option_name,
            ));
        }

        self.settings.push(setting);
        Ok(())
    }

    /// Returns true if a setting with the given pair exists.
    #[must_use]
    pub fn contains(&self, namespace: &str, option_name: &str) -> bool {
        self.get(namespace, option_name).is_some()
    }

    /// Returns the value of the setting with the given pair, if present.
    #[must_use]
    pub fn get(&self, namespace: &str, option_name: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|s| s.namespace == namespace && s.option_name == option_name)
            .map(|s| s.value.as_str())
    }

    /// Returns the number of settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    /// Returns true if there are no settings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Iterates over the settings in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, OptionSetting> {
        self.settings.iter()
    }
}

impl<'a> IntoIterator for &'a OptionSettings {
    type Item = &'a OptionSetting;
    type IntoIter = std::slice::Iter<'a, OptionSetting>;

    fn into_iter(self) -> Self::IntoIter {
        self.settings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut settings = OptionSettings::new();
        settings
            .insert(OptionSetting::new(NS_AUTOSCALING_GROUP, OPT_MIN_SIZE, "1"))
            .unwrap();

        assert_eq!(settings.get(NS_AUTOSCALING_GROUP, OPT_MIN_SIZE), Some("1"));
        assert_eq!(settings.get(NS_AUTOSCALING_GROUP, OPT_MAX_SIZE), None);
        assert_eq!(settings.len(), 1);
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let mut settings = OptionSettings::new();
        settings
            .insert(OptionSetting::new(NS_AUTOSCALING_GROUP, OPT_MIN_SIZE, "1"))
            .unwrap();

        let err = settings
            .insert(OptionSetting::new(NS_AUTOSCALING_GROUP, OPT_MIN_SIZE, "2"))
            .unwrap_err();

        assert!(matches!(err, ManifestError::DuplicateOption { .. }));
        assert_eq!(settings.len(), 1);
    }

    #[test]
    fn test_same_name_different_namespace_allowed() {
        let mut settings = OptionSettings::new();
        settings
            .insert(OptionSetting::new("ns:one", "Size", "1"))
            .unwrap();
        settings
            .insert(OptionSetting::new("ns:two", "Size", "2"))
            .unwrap();

        assert_eq!(settings.len(), 2);
    }

    #[test]
    fn test_serializes_pascal_case() {
        let setting = OptionSetting::new(NS_EC2_INSTANCES, OPT_INSTANCE_TYPES, "t2.micro");
        let json = serde_json::to_value(&setting).unwrap();

        assert_eq!(json["Namespace"], "aws:ec2:instances");
        assert_eq!(json["OptionName"], "InstanceTypes");
        assert_eq!(json["Value"], "t2.micro");
    }
}
