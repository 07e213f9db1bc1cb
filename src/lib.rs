//! Modelyard - an in-memory model artifact registry.
//!
//! Tracks trained machine-learning model artifacts, their versions,
//! deployment state, and associated metrics and tags, independent of any
//! cloud backend. The registry records endpoint metadata only; it never
//! invokes inference and never talks to a provider.
//!
//! ## Quick Start
//!
//! Use the [`prelude`] module for common imports:
//!
//! ```rust,ignore
//! use modelyard::prelude::*;
//!
//! let registry = Registry::new();
//! let receipt = registry.register(&model, RegistrationMetadata::new("temp-sensor"))?;
//!
//! let deployment = registry.deploy(
//!     &receipt.identity,
//!     DeploymentConfig::default().with_instance_count(2),
//! )?;
//!
//! // Completion arrives out of band; subscribe instead of polling.
//! let events = registry.events().subscribe();
//! ```
//!
//! ## Module Organization
//!
//! - [`registry`] - The registry: state ownership and the six operations
//! - [`model`] - Model records and the `TrainedModel` producer contract
//! - [`deployment`] - Deployment records and their status state machine
//! - [`events`] - Pub/sub bus for lifecycle events
//! - [`config`] - Registry configuration, env-var construction
//! - [`error`] - Canonical error enum and result alias
//!
//! ## Scope
//!
//! Everything is in-memory and process-wide: no persistence across
//! restarts, no authentication, no multi-tenant isolation. A production
//! wrapper would expose these operations over REST/RPC and delegate
//! storage and identity to real subsystems.

pub mod config;
pub mod deployment;
pub mod error;
pub mod events;
pub mod model;
pub mod registry;

/// Common imports for registry users.
pub mod prelude {
    pub use crate::config::{MissBehavior, RegistryConfig};
    pub use crate::deployment::{
        Deployment, DeploymentConfig, DeploymentOutcome, DeploymentStatus, EndpointDescriptor,
        InstanceConfig,
    };
    pub use crate::error::{RegistryError, RegistryResult};
    pub use crate::events::{RegistryEvent, Subscription};
    pub use crate::model::{
        Framework, ModelRecord, ModelStatus, RegistrationMetadata, RegistrationReceipt,
        TrainedModel,
    };
    pub use crate::registry::{ModelFilter, Registry, RegistryStats};
}
