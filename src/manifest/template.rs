//! The infrastructure-change template.
//!
//! A template is the single submission unit handed to the provisioning
//! engine: a map of logical ids to lowered resources in the engine's fixed
//! schema.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::ManifestError;

use super::resources::ResourceNode;

/// Template format version understood by the provisioning engine.
const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// A complete infrastructure-change template.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Template {
    /// Format version marker.
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: String,
    /// Human-readable description.
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Resources keyed by logical id.
    #[serde(rename = "Resources")]
    resources: BTreeMap<String, ResourceNode>,
}

impl Template {
    /// Creates an empty template.
    #[must_use]
    pub fn new() -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: None,
            resources: BTreeMap::new(),
        }
    }

    /// Sets the template description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a resource under the given logical id.
    ///
    /// # Errors
    ///
    /// Returns an error if the logical id is already taken.
    pub fn add_resource(
        &mut self,
        logical_id: impl Into<String>,
        node: ResourceNode,
    ) -> Result<(), ManifestError> {
        let logical_id = logical_id.into();

        if self.resources.contains_key(&logical_id) {
            return Err(ManifestError::DuplicateLogicalId { logical_id });
        }

        self.resources.insert(logical_id, node);
        Ok(())
    }

    /// Returns the resource with the given logical id, if present.
    #[must_use]
    pub fn get(&self, logical_id: &str) -> Option<&ResourceNode> {
        self.resources.get(logical_id)
    }

    /// Returns all logical ids in the template.
    #[must_use]
    pub fn logical_ids(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    /// Iterates over (logical id, resource) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResourceNode)> {
        self.resources.iter()
    }

    /// Returns the number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if the template holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Serializes the template to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string(self).map_err(|e| ManifestError::SerializationFailed {
            message: e.to_string(),
        })
    }

    /// Serializes the template to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(|e| ManifestError::SerializationFailed {
            message: e.to_string(),
        })
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::resources::{ApplicationDescriptor, TYPE_APPLICATION};

    fn application_node() -> ResourceNode {
        ApplicationDescriptor::new("Application", "MyWebApp")
            .unwrap()
            .to_node()
            .unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let mut template = Template::new();
        template
            .add_resource("Application", application_node())
            .unwrap();

        assert_eq!(template.len(), 1);
        let node = template.get("Application").unwrap();
        assert_eq!(node.resource_type, TYPE_APPLICATION);
    }

    #[test]
    fn test_duplicate_logical_id_rejected() {
        let mut template = Template::new();
        template
            .add_resource("Application", application_node())
            .unwrap();

        let err = template
            .add_resource("Application", application_node())
            .unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateLogicalId { .. }));
    }

    #[test]
    fn test_json_shape() {
        let mut template = Template::new().with_description("web app deployment");
        template
            .add_resource("Application", application_node())
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&template.to_json().unwrap()).unwrap();

        assert_eq!(json["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(json["Description"], "web app deployment");
        assert_eq!(
            json["Resources"]["Application"]["Type"],
            "AWS::ElasticBeanstalk::Application"
        );
        assert_eq!(
            json["Resources"]["Application"]["Properties"]["ApplicationName"],
            "MyWebApp"
        );
        // No dependencies on the application: the key is omitted entirely.
        assert!(json["Resources"]["Application"].get("DependsOn").is_none());
    }
}
