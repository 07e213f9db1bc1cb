//! Unified error types for the modelyard public API.
//!
//! All public registry operations return [`RegistryResult`]. Lookup-style
//! operations distinguish "the model does not exist" from "the model exists
//! but has no metrics recorded" so callers can decide fallback behavior
//! instead of receiving fabricated data.

use thiserror::Error;

/// The canonical error type for registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// `register` was called with a model that does not report itself trained.
    #[error("Model '{0}' is not trained; train before registering")]
    NotTrained(String),

    /// No registered model matches the given name or identity.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// No deployment matches the given deployment ID.
    #[error("Deployment not found: {0}")]
    DeploymentNotFound(String),

    /// The model exists but no metrics were recorded at registration.
    #[error("No metrics recorded for model: {0}")]
    MetricsUnavailable(String),

    /// The deployment already reached `succeeded` or `failed`; terminal
    /// states accept no further transitions.
    #[error("Deployment '{0}' is already in a terminal state")]
    DeploymentComplete(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
