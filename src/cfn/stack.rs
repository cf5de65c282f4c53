//! Stack submission to the provisioning engine.
//!
//! The whole manifest is handed to CloudFormation as one stack create or
//! update. Everything past that point (resource ordering, rollback, retry)
//! belongs to the engine; its errors are surfaced verbatim.

use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::error::ProvideErrorMetadata;
use aws_sdk_cloudformation::types::{Capability, Stack};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{BstalkError, Result, SubmitError};
use crate::manifest::DeploymentManifest;

/// Message fragment CloudFormation returns for a no-op update.
const NO_UPDATES_MESSAGE: &str = "No updates are to be performed";

/// Message fragment CloudFormation returns when describing a missing stack.
const STACK_MISSING_MESSAGE: &str = "does not exist";

/// Submits deployment manifests to the provisioning engine.
#[derive(Debug, Clone)]
pub struct StackEngine {
    /// CloudFormation client.
    client: Client,
}

/// Outcome of a manifest submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackOutcome {
    /// A new stack was created.
    Created {
        /// Identifier assigned by the engine.
        stack_id: String,
    },
    /// An existing stack was updated (re-deployment).
    Updated {
        /// Identifier assigned by the engine.
        stack_id: String,
    },
}

/// Point-in-time summary of a submitted stack.
#[derive(Debug, Clone)]
pub struct StackSummary {
    /// Stack name.
    pub name: String,
    /// Engine-reported status (e.g. `CREATE_COMPLETE`).
    pub status: String,
    /// Optional reason accompanying the status.
    pub status_reason: Option<String>,
    /// When the stack last changed.
    pub last_changed: Option<DateTime<Utc>>,
}

impl StackEngine {
    /// Creates a new stack engine.
    pub async fn new(region: Option<&str>) -> Self {
        let config = if let Some(region_str) = region {
            aws_config::from_env()
                .region(aws_config::Region::new(region_str.to_string()))
                .load()
                .await
        } else {
            aws_config::load_from_env().await
        };

        Self::with_client(Client::new(&config))
    }

    /// Creates a stack engine with an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Submits the manifest as one stack create or update.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::NoChanges` when the engine reports the stack is
    /// already up to date, and `SubmitError::EngineRejected` with the
    /// engine's verbatim message for anything else.
    pub async fn submit(&self, manifest: &DeploymentManifest) -> Result<StackOutcome> {
        let template_body = manifest.template.to_json()?;
        let token = uuid::Uuid::new_v4().to_string();

        if self.describe(&manifest.stack_name).await?.is_some() {
            self.update(&manifest.stack_name, &template_body, &token)
                .await
        } else {
            self.create(&manifest.stack_name, &template_body, &token)
                .await
        }
    }

    /// Returns a summary of the stack, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    pub async fn status(&self, stack_name: &str) -> Result<Option<StackSummary>> {
        Ok(self.describe(stack_name).await?.map(|stack| summarize(&stack)))
    }

    /// Creates a new stack.
    async fn create(
        &self,
        stack_name: &str,
        template_body: &str,
        token: &str,
    ) -> Result<StackOutcome> {
        info!("Creating stack '{stack_name}'");

        let response = self
            .client
            .create_stack()
            .stack_name(stack_name)
            .template_body(template_body)
            .capabilities(Capability::CapabilityIam)
            .client_request_token(token)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                BstalkError::Submit(SubmitError::engine(error_message(&service_err)))
            })?;

        let stack_id = response.stack_id().map(ToString::to_string).ok_or_else(|| {
            BstalkError::Submit(SubmitError::InvalidResponse {
                message: String::from("CreateStack response carried no stack id"),
            })
        })?;

        debug!("Stack '{stack_name}' created: {stack_id}");
        Ok(StackOutcome::Created { stack_id })
    }

    /// Updates an existing stack.
    async fn update(
        &self,
        stack_name: &str,
        template_body: &str,
        token: &str,
    ) -> Result<StackOutcome> {
        info!("Updating stack '{stack_name}'");

        let response = self
            .client
            .update_stack()
            .stack_name(stack_name)
            .template_body(template_body)
            .capabilities(Capability::CapabilityIam)
            .client_request_token(token)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                let message = error_message(&service_err);
                if message.contains(NO_UPDATES_MESSAGE) {
                    BstalkError::Submit(SubmitError::NoChanges {
                        stack_name: stack_name.to_string(),
                    })
                } else {
                    BstalkError::Submit(SubmitError::engine(message))
                }
            })?;

        let stack_id = response.stack_id().map(ToString::to_string).ok_or_else(|| {
            BstalkError::Submit(SubmitError::InvalidResponse {
                message: String::from("UpdateStack response carried no stack id"),
            })
        })?;

        debug!("Stack '{stack_name}' updated: {stack_id}");
        Ok(StackOutcome::Updated { stack_id })
    }

    /// Describes a stack, mapping "does not exist" to `None`.
    async fn describe(&self, stack_name: &str) -> Result<Option<Stack>> {
        let result = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await;

        match result {
            Ok(response) => Ok(response.stacks().first().cloned()),
            Err(sdk_err) => {
                let service_err = sdk_err.into_service_error();
                let message = error_message(&service_err);
                if message.contains(STACK_MISSING_MESSAGE) {
                    Ok(None)
                } else {
                    Err(BstalkError::Submit(SubmitError::engine(message)))
                }
            }
        }
    }
}

impl StackOutcome {
    /// Returns the engine-assigned stack identifier.
    #[must_use]
    pub fn stack_id(&self) -> &str {
        match self {
            Self::Created { stack_id } | Self::Updated { stack_id } => stack_id,
        }
    }
}

impl std::fmt::Display for StackOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created { stack_id } => write!(f, "created ({stack_id})"),
            Self::Updated { stack_id } => write!(f, "updated ({stack_id})"),
        }
    }
}

/// Extracts the engine's message from a service error, unchanged.
fn error_message<E>(err: &E) -> String
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    err.message()
        .map_or_else(|| err.to_string(), ToString::to_string)
}

/// Builds a summary from an engine stack record.
fn summarize(stack: &Stack) -> StackSummary {
    let last_changed = stack
        .last_updated_time()
        .or_else(|| stack.creation_time())
        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()));

    StackSummary {
        name: stack.stack_name().unwrap_or_default().to_string(),
        status: stack
            .stack_status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        status_reason: stack.stack_status_reason().map(ToString::to_string),
        last_changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let created = StackOutcome::Created {
            stack_id: String::from("arn:aws:cloudformation:eu-west-1:123:stack/x/abc"),
        };
        assert_eq!(
            created.stack_id(),
            "arn:aws:cloudformation:eu-west-1:123:stack/x/abc"
        );
        assert!(created.to_string().starts_with("created"));

        let updated = StackOutcome::Updated {
            stack_id: String::from("id"),
        };
        assert!(updated.to_string().starts_with("updated"));
    }
}
