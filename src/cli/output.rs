//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying manifests,
//! submission outcomes, and stack status in text or JSON form.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::cfn::{StackOutcome, StackSummary};
use crate::manifest::DeploymentManifest;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Resource row for table display.
#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Logical ID")]
    logical_id: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Depends On")]
    depends_on: String,
}

/// Option setting row for table display.
#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Option")]
    option_name: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats an assembled manifest for display.
    #[must_use]
    pub fn format_manifest(&self, manifest: &DeploymentManifest) -> String {
        match self.format {
            OutputFormat::Text => Self::manifest_text(manifest),
            OutputFormat::Json => Self::manifest_json(manifest),
        }
    }

    /// Formats a submission outcome for display.
    #[must_use]
    pub fn format_outcome(&self, stack_name: &str, outcome: &StackOutcome) -> String {
        match self.format {
            OutputFormat::Text => {
                let verb = match outcome {
                    StackOutcome::Created { .. } => "created",
                    StackOutcome::Updated { .. } => "updated",
                };
                format!(
                    "{} stack '{}' {} ({})",
                    "Submitted:".green().bold(),
                    stack_name,
                    verb,
                    outcome.stack_id()
                )
            }
            OutputFormat::Json => {
                let (action, stack_id) = match outcome {
                    StackOutcome::Created { stack_id } => ("created", stack_id),
                    StackOutcome::Updated { stack_id } => ("updated", stack_id),
                };
                serde_json::json!({
                    "stack_name": stack_name,
                    "action": action,
                    "stack_id": stack_id,
                })
                .to_string()
            }
        }
    }

    /// Formats stack status for display.
    #[must_use]
    pub fn format_status(&self, stack_name: &str, summary: Option<&StackSummary>) -> String {
        match self.format {
            OutputFormat::Text => summary.map_or_else(
                || format!("Stack '{stack_name}' does not exist."),
                |s| {
                    let mut out = String::new();
                    let _ = writeln!(out, "{} {}", "Stack:".bold(), s.name);
                    let _ = writeln!(out, "{} {}", "Status:".bold(), colorize_status(&s.status));
                    if let Some(reason) = &s.status_reason {
                        let _ = writeln!(out, "{} {}", "Reason:".bold(), reason);
                    }
                    if let Some(changed) = s.last_changed {
                        let _ = writeln!(out, "{} {}", "Last changed:".bold(), changed);
                    }
                    out
                },
            ),
            OutputFormat::Json => summary.map_or_else(
                || serde_json::json!({ "stack_name": stack_name, "exists": false }).to_string(),
                |s| {
                    serde_json::json!({
                        "stack_name": s.name,
                        "exists": true,
                        "status": s.status,
                        "status_reason": s.status_reason,
                        "last_changed": s.last_changed.map(|t| t.to_rfc3339()),
                    })
                    .to_string()
                },
            ),
        }
    }

    /// Renders the manifest as colored text tables.
    fn manifest_text(manifest: &DeploymentManifest) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{} {} ({} resources)",
            "Manifest:".bold(),
            manifest.stack_name,
            manifest.resource_count()
        );
        let _ = writeln!(out, "{} {}", "Application:".bold(), manifest.application_name);
        let _ = writeln!(out, "{} {}", "Environment:".bold(), manifest.environment_name);
        let _ = writeln!(out, "{} {}", "Bundle:".bold(), manifest.bundle);
        let _ = writeln!(out);

        let rows: Vec<ResourceRow> = manifest
            .template
            .iter()
            .map(|(logical_id, node)| ResourceRow {
                logical_id: logical_id.clone(),
                resource_type: node.resource_type.clone(),
                depends_on: node.depends_on.join(", "),
            })
            .collect();
        let _ = writeln!(out, "{}", Table::new(rows));

        if let Some(environment) = manifest.template.get(crate::manifest::ID_ENVIRONMENT) {
            if let Some(settings) = environment.properties["OptionSettings"].as_array() {
                let option_rows: Vec<OptionRow> = settings
                    .iter()
                    .map(|s| OptionRow {
                        namespace: s["Namespace"].as_str().unwrap_or_default().to_string(),
                        option_name: s["OptionName"].as_str().unwrap_or_default().to_string(),
                        value: s["Value"].as_str().unwrap_or_default().to_string(),
                    })
                    .collect();
                let _ = writeln!(out, "{}", Table::new(option_rows));
            }
        }

        out
    }

    /// Renders a manifest summary as JSON.
    fn manifest_json(manifest: &DeploymentManifest) -> String {
        serde_json::json!({
            "stack_name": manifest.stack_name,
            "application_name": manifest.application_name,
            "environment_name": manifest.environment_name,
            "bundle": manifest.bundle,
            "resources": manifest.template.logical_ids(),
            "created_at": manifest.created_at.to_rfc3339(),
        })
        .to_string()
    }
}

/// Colors an engine status string by its suffix.
fn colorize_status(status: &str) -> String {
    if status.ends_with("_COMPLETE") {
        status.green().to_string()
    } else if status.ends_with("_FAILED") || status.contains("ROLLBACK") {
        status.red().to_string()
    } else {
        status.yellow().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::BundleLocation;
    use crate::cfn::StackOutcome;
    use crate::config::{ApplicationConfig, ArtifactConfig, DeployConfig};
    use crate::manifest::ManifestBuilder;

    fn test_manifest() -> DeploymentManifest {
        let config = DeployConfig {
            application: ApplicationConfig {
                name: String::from("MyWebApp"),
                environment: None,
                description: None,
            },
            artifact: ArtifactConfig {
                path: std::path::PathBuf::from("./app.zip"),
                bucket: String::from("deploy-bundles"),
                prefix: None,
                region: None,
            },
            platform: crate::config::PlatformConfig::default(),
            scaling: crate::config::ScalingConfig::default(),
            identity: crate::config::IdentityConfig::default(),
            options: vec![],
            stack: crate::config::StackConfig::default(),
        };
        ManifestBuilder::new(&config)
            .build(&BundleLocation::new("deploy-bundles", "abc.zip"))
            .unwrap()
    }

    #[test]
    fn test_manifest_json_output() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_manifest(&test_manifest());

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["application_name"], "MyWebApp");
        assert_eq!(json["resources"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_manifest_text_output_mentions_resources() {
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_manifest(&test_manifest());

        assert!(output.contains("MyWebApp-deploy"));
        assert!(output.contains("AWS::ElasticBeanstalk::Environment"));
        assert!(output.contains("IamInstanceProfile"));
    }

    #[test]
    fn test_outcome_json_output() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let outcome = StackOutcome::Created {
            stack_id: String::from("id-1"),
        };
        let output = formatter.format_outcome("MyWebApp-deploy", &outcome);

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["action"], "created");
        assert_eq!(json["stack_id"], "id-1");
    }

    #[test]
    fn test_status_missing_stack() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_status("MyWebApp-deploy", None);

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["exists"], false);
    }
}
