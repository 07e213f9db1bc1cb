//! Registry configuration.
//!
//! Defaults match the reference deployment shape; every knob can also be
//! picked up from the environment via [`RegistryConfig::from_env`]:
//!
//! - `MODELYARD_BASE_URI` — base for registry reference and endpoint URIs
//! - `MODELYARD_MISS_BEHAVIOR` — `error` (default) or `placeholder`
//! - `MODELYARD_COMPLETION_DELAY_MS` — simulated deployment completion delay

use crate::deployment::{InstanceConfig, DEFAULT_INSTANCE_COUNT, DEFAULT_INSTANCE_TYPE};
use crate::error::{RegistryError, RegistryResult};
use std::str::FromStr;
use std::time::Duration;

/// Default base for registry reference URIs.
pub const DEFAULT_BASE_URI: &str = "registry://local";

/// Default delay before a deployment's simulated completion fires.
pub const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_secs(2);

/// What `get` does when no record matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissBehavior {
    /// Fail with `ModelNotFound`. The strict default.
    #[default]
    Error,
    /// Synthesize a demo-friendly placeholder record instead of failing.
    /// Compatibility mode for callers that expect the legacy stub behavior.
    Placeholder,
}

impl FromStr for MissBehavior {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(MissBehavior::Error),
            "placeholder" => Ok(MissBehavior::Placeholder),
            other => Err(RegistryError::Config(format!(
                "unknown miss behavior '{}' (expected 'error' or 'placeholder')",
                other
            ))),
        }
    }
}

/// Configuration for a registry instance.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base for registry reference and synthesized endpoint URIs.
    pub base_uri: String,
    /// Miss handling for `get`.
    pub miss_behavior: MissBehavior,
    /// Instance defaults merged under each deployment config.
    pub default_instances: InstanceConfig,
    /// Delay before the background completion task marks a deployment
    /// `succeeded` (unless an external signal resolved it first).
    pub completion_delay: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_string(),
            miss_behavior: MissBehavior::default(),
            default_instances: InstanceConfig {
                instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
                instance_count: DEFAULT_INSTANCE_COUNT,
            },
            completion_delay: DEFAULT_COMPLETION_DELAY,
        }
    }
}

impl RegistryConfig {
    /// Build a config from environment variables, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> RegistryResult<Self> {
        let mut config = Self::default();

        if let Ok(uri) = std::env::var("MODELYARD_BASE_URI") {
            config.base_uri = uri;
        }
        if let Ok(behavior) = std::env::var("MODELYARD_MISS_BEHAVIOR") {
            config.miss_behavior = behavior.parse()?;
        }
        if let Ok(delay) = std::env::var("MODELYARD_COMPLETION_DELAY_MS") {
            let millis: u64 = delay.parse().map_err(|_| {
                RegistryError::Config(format!(
                    "MODELYARD_COMPLETION_DELAY_MS must be an integer, got '{}'",
                    delay
                ))
            })?;
            config.completion_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// Shorten the completion delay, mainly for tests and demos.
    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }

    /// Select miss handling for `get`.
    pub fn with_miss_behavior(mut self, behavior: MissBehavior) -> Self {
        self.miss_behavior = behavior;
        self
    }
}
