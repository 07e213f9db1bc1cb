//! Deployment records: one tracked attempt to expose a model at an endpoint.
//!
//! The registry records endpoint metadata only; it never invokes inference.
//! A deployment starts in `Deploying` and ends in exactly one of the two
//! terminal states, after which its status is immutable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instance type used when the deployment config does not name one.
pub const DEFAULT_INSTANCE_TYPE: &str = "Standard_DS3_v2";

/// Instance count used when the deployment config does not name one.
pub const DEFAULT_INSTANCE_COUNT: u32 = 1;

/// Lifecycle status of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeploymentStatus {
    Deploying,
    Succeeded,
    Failed { reason: String },
}

impl DeploymentStatus {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeploymentStatus::Deploying)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::Deploying => write!(f, "deploying"),
            DeploymentStatus::Succeeded => write!(f, "succeeded"),
            DeploymentStatus::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Terminal outcome reported by an external completion signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentOutcome {
    Succeeded,
    Failed { reason: String },
}

impl From<DeploymentOutcome> for DeploymentStatus {
    fn from(outcome: DeploymentOutcome) -> Self {
        match outcome {
            DeploymentOutcome::Succeeded => DeploymentStatus::Succeeded,
            DeploymentOutcome::Failed { reason } => DeploymentStatus::Failed { reason },
        }
    }
}

/// Endpoint metadata, passed through from configuration. Opaque to the
/// registry beyond storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Scoring URL clients would call.
    pub scoring_uri: String,
    /// Authentication mode label (e.g. "key", "aml_token").
    pub auth_mode: String,
    /// Schema-discovery URL for the endpoint.
    pub swagger_uri: String,
}

/// Compute shape backing a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub instance_type: String,
    pub instance_count: u32,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            instance_count: DEFAULT_INSTANCE_COUNT,
        }
    }
}

/// Caller-supplied deployment options. Unset fields fall back to the
/// registry's configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub instance_type: Option<String>,
    pub instance_count: Option<u32>,
    /// Endpoint metadata to record verbatim. When absent the registry
    /// synthesizes a descriptor from its base URI.
    pub endpoint: Option<EndpointDescriptor>,
}

impl DeploymentConfig {
    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = Some(instance_type.into());
        self
    }

    pub fn with_instance_count(mut self, count: u32) -> Self {
        self.instance_count = Some(count);
        self
    }

    pub fn with_endpoint(mut self, endpoint: EndpointDescriptor) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Merge this config over the given defaults.
    pub(crate) fn resolve_instances(&self, defaults: &InstanceConfig) -> InstanceConfig {
        InstanceConfig {
            instance_type: self
                .instance_type
                .clone()
                .unwrap_or_else(|| defaults.instance_type.clone()),
            instance_count: self.instance_count.unwrap_or(defaults.instance_count),
        }
    }
}

/// One tracked attempt to expose a registered model at a serving endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub deployment_id: String,
    pub endpoint_id: String,
    /// Back-reference to the owning model, by identity lookup only.
    pub model_identity: String,
    pub status: DeploymentStatus,
    pub endpoint: EndpointDescriptor,
    pub instances: InstanceConfig,
    /// Epoch milliseconds.
    pub created_at: u64,
}
