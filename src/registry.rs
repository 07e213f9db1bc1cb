//! The registry itself: owned state plus the six public operations.
//!
//! All state lives behind one mutex so the calling thread and the deferred
//! deployment-completion task can both mutate it safely. `Registry` is a
//! cheap cloneable handle; clones share the same store and event bus.
//!
//! # Example
//!
//! ```rust,ignore
//! use modelyard::prelude::*;
//!
//! let registry = Registry::new();
//! let receipt = registry.register(&model, RegistrationMetadata::new("temp-sensor"))?;
//! let deployment = registry.deploy(&receipt.identity, DeploymentConfig::default())?;
//! assert_eq!(deployment.status, DeploymentStatus::Deploying);
//! ```

use crate::config::{MissBehavior, RegistryConfig};
use crate::deployment::{
    Deployment, DeploymentConfig, DeploymentOutcome, DeploymentStatus, EndpointDescriptor,
};
use crate::error::{RegistryError, RegistryResult};
use crate::events::{EventBus, RegistryEvent};
use crate::model::{
    compare_versions, Framework, ModelRecord, ModelStatus, RegistrationMetadata,
    RegistrationReceipt, TrainedModel, DEFAULT_VERSION,
};
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Query filter for [`Registry::list`].
///
/// An empty filter matches every record. `name` matches by substring;
/// every tag pair must match exactly (AND semantics).
#[derive(Debug, Clone, Default)]
pub struct ModelFilter {
    pub name: Option<String>,
    pub tags: HashMap<String, String>,
}

impl ModelFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    fn matches(&self, record: &ModelRecord) -> bool {
        if let Some(needle) = &self.name {
            if !record.name.contains(needle.as_str()) {
                return false;
            }
        }
        self.tags
            .iter()
            .all(|(k, v)| record.tags.get(k) == Some(v))
    }
}

/// Read-only snapshot of registry counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub models: usize,
    pub deployments_total: usize,
    pub deployments_in_flight: usize,
    pub deployments_succeeded: usize,
    pub deployments_failed: usize,
}

/// Mutable state, guarded by the registry's mutex.
struct RegistryInner {
    /// Identity-keyed records.
    records: HashMap<String, ModelRecord>,
    /// Registration order of identities, for stable listing.
    insertion_order: Vec<String>,
    /// deployment_id -> owning model identity.
    deployment_index: HashMap<String, String>,
}

impl RegistryInner {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            insertion_order: Vec::new(),
            deployment_index: HashMap::new(),
        }
    }

    /// Records for `name` in registration order.
    fn records_named<'a>(&'a self, name: &str) -> Vec<&'a ModelRecord> {
        self.insertion_order
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|r| r.name == name)
            .collect()
    }

    /// Drive a deployment to a terminal state. Returns the updated snapshot,
    /// or `None` if the deployment was already terminal or is gone.
    fn transition(
        &mut self,
        model_identity: &str,
        deployment_id: &str,
        status: DeploymentStatus,
    ) -> Option<Deployment> {
        let record = self.records.get_mut(model_identity)?;
        let deployment = record
            .deployments
            .iter_mut()
            .find(|d| d.deployment_id == deployment_id)?;
        if deployment.status.is_terminal() {
            return None;
        }
        deployment.status = status;
        let snapshot = deployment.clone();
        record.last_modified = now_millis();
        Some(snapshot)
    }
}

/// In-memory model artifact registry.
///
/// Owns every [`ModelRecord`] for its lifetime. Records are created only by
/// [`register`](Registry::register) and never deleted; deployments are
/// created only by [`deploy`](Registry::deploy) and are immutable once
/// terminal.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Mutex<RegistryInner>>,
    config: Arc<RegistryConfig>,
    events: Arc<EventBus>,
}

impl Registry {
    /// Create a registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with explicit configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner::new())),
            config: Arc::new(config),
            events: Arc::new(EventBus::new()),
        }
    }

    /// The event bus carrying this registry's lifecycle events. Subscribe
    /// here to observe deployment completion without polling.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register a trained model, assigning it a fresh identity.
    ///
    /// Hard precondition: the model must report itself trained. On failure
    /// nothing is recorded. Metrics are copied verbatim from the producer
    /// when available and recorded as absent otherwise; the registry never
    /// fabricates metric values.
    pub fn register(
        &self,
        model: &dyn TrainedModel,
        metadata: RegistrationMetadata,
    ) -> RegistryResult<RegistrationReceipt> {
        if !model.is_trained() {
            return Err(RegistryError::NotTrained(metadata.name));
        }

        let identity = Uuid::new_v4().to_string();
        let version = metadata
            .version
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());
        let framework = Framework::classify(model.kind());
        let now = now_millis();

        let record = ModelRecord {
            identity: identity.clone(),
            name: metadata.name.clone(),
            version: version.clone(),
            description: metadata.description,
            tags: metadata.tags,
            artifact_uri: model.artifact_uri(),
            framework,
            metrics: model.last_training_results(),
            status: ModelStatus::Registered,
            registered_at: now,
            last_modified: now,
            deployments: Vec::new(),
        };

        {
            let mut inner = self.inner.lock().unwrap();
            inner.insertion_order.push(identity.clone());
            inner.records.insert(identity.clone(), record);
        }

        info!(
            "Registered model '{}' version {} as {} ({})",
            metadata.name, version, identity, framework
        );
        self.events.publish(RegistryEvent::ModelRegistered {
            identity: identity.clone(),
            name: metadata.name.clone(),
            version: version.clone(),
        });

        Ok(RegistrationReceipt {
            reference_uri: self.model_reference_uri(&identity, &version),
            identity,
            name: metadata.name,
            version,
            status: ModelStatus::Registered,
            deployments: Vec::new(),
        })
    }

    /// Look up a model by name and version.
    ///
    /// `version` of `None` (or `"latest"`) selects the highest version among
    /// same-named records, ties broken by most recent registration. The
    /// returned record is presented with status `Ready`; the stored status
    /// is left untouched.
    ///
    /// Miss behavior follows the configured [`MissBehavior`]: the default
    /// fails with `ModelNotFound`; placeholder mode synthesizes a stub
    /// record for callers that rely on the legacy demo behavior.
    pub fn get(&self, name: &str, version: Option<&str>) -> RegistryResult<ModelRecord> {
        let requested = version.filter(|v| *v != "latest");
        let found = {
            let inner = self.inner.lock().unwrap();
            let candidates = inner.records_named(name);
            select_version(&candidates, requested).cloned()
        };

        match found {
            Some(mut record) => {
                debug!("get '{}' resolved to {}", name, record.identity);
                record.status = ModelStatus::Ready;
                Ok(record)
            }
            None => match self.config.miss_behavior {
                MissBehavior::Error => Err(RegistryError::ModelNotFound(name.to_string())),
                MissBehavior::Placeholder => {
                    warn!("get '{}' missed; synthesizing placeholder record", name);
                    Ok(self.placeholder_record(name, requested))
                }
            },
        }
    }

    /// List records matching the filter, in registration order.
    ///
    /// An empty filter returns the full registry contents; an empty
    /// registry yields an empty vec.
    pub fn list(&self, filter: &ModelFilter) -> Vec<ModelRecord> {
        let inner = self.inner.lock().unwrap();
        inner
            .insertion_order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    /// Start a deployment for a registered model.
    ///
    /// Returns immediately with the deployment in `Deploying` state and
    /// schedules a background completion that marks it `Succeeded` after
    /// the configured delay, unless an external signal resolved it first.
    /// Callers needing the terminal state poll `get` or subscribe via
    /// [`events`](Registry::events).
    pub fn deploy(
        &self,
        model_identity: &str,
        config: DeploymentConfig,
    ) -> RegistryResult<Deployment> {
        let deployment_id = Uuid::new_v4().to_string();
        let endpoint_id = Uuid::new_v4().to_string();
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| self.synthesized_endpoint(&endpoint_id));
        let instances = config.resolve_instances(&self.config.default_instances);

        let deployment = {
            let mut inner = self.inner.lock().unwrap();
            let record = inner
                .records
                .get_mut(model_identity)
                .ok_or_else(|| RegistryError::ModelNotFound(model_identity.to_string()))?;

            let deployment = Deployment {
                deployment_id: deployment_id.clone(),
                endpoint_id,
                model_identity: model_identity.to_string(),
                status: DeploymentStatus::Deploying,
                endpoint,
                instances,
                created_at: now_millis(),
            };
            record.deployments.push(deployment.clone());
            record.last_modified = deployment.created_at;
            inner
                .deployment_index
                .insert(deployment_id.clone(), model_identity.to_string());
            deployment
        };

        info!(
            "Deployment {} started for model {} ({} x {})",
            deployment_id,
            model_identity,
            deployment.instances.instance_count,
            deployment.instances.instance_type
        );
        self.events.publish(RegistryEvent::DeploymentStarted {
            deployment_id: deployment_id.clone(),
            model_identity: model_identity.to_string(),
        });

        self.schedule_completion(model_identity.to_string(), deployment_id);
        Ok(deployment)
    }

    /// Drive a deployment to a terminal state from an external signal.
    ///
    /// This is the failure path the simulated timer lacks: a serving
    /// backend (or an operator) reports the real outcome. Fails with
    /// `DeploymentComplete` if the deployment already reached a terminal
    /// state.
    pub fn resolve_deployment(
        &self,
        deployment_id: &str,
        outcome: DeploymentOutcome,
    ) -> RegistryResult<Deployment> {
        let (snapshot, model_identity) = {
            let mut inner = self.inner.lock().unwrap();
            let model_identity = inner
                .deployment_index
                .get(deployment_id)
                .cloned()
                .ok_or_else(|| RegistryError::DeploymentNotFound(deployment_id.to_string()))?;
            let snapshot = inner
                .transition(&model_identity, deployment_id, outcome.into())
                .ok_or_else(|| RegistryError::DeploymentComplete(deployment_id.to_string()))?;
            (snapshot, model_identity)
        };

        info!(
            "Deployment {} resolved externally: {}",
            deployment_id, snapshot.status
        );
        self.events.publish(RegistryEvent::DeploymentCompleted {
            deployment_id: deployment_id.to_string(),
            model_identity,
            status: snapshot.status.clone(),
        });
        Ok(snapshot)
    }

    /// Metrics recorded for a model at registration.
    ///
    /// Distinguishes the two miss cases explicitly: unknown identity fails
    /// with `ModelNotFound`, a known model without recorded metrics fails
    /// with `MetricsUnavailable`.
    pub fn get_metrics(&self, model_identity: &str) -> RegistryResult<HashMap<String, f64>> {
        let inner = self.inner.lock().unwrap();
        let record = inner
            .records
            .get(model_identity)
            .ok_or_else(|| RegistryError::ModelNotFound(model_identity.to_string()))?;
        record
            .metrics
            .clone()
            .ok_or_else(|| RegistryError::MetricsUnavailable(model_identity.to_string()))
    }

    /// Merge tags into a model record (shallow merge: new keys overwrite,
    /// unmentioned keys are preserved). Returns the merged mapping.
    pub fn update_tags(
        &self,
        model_identity: &str,
        tags: HashMap<String, String>,
    ) -> RegistryResult<HashMap<String, String>> {
        let merged = {
            let mut inner = self.inner.lock().unwrap();
            let record = inner
                .records
                .get_mut(model_identity)
                .ok_or_else(|| RegistryError::ModelNotFound(model_identity.to_string()))?;
            record.tags.extend(tags);
            record.last_modified = now_millis();
            record.tags.clone()
        };

        debug!("Tags updated for model {}", model_identity);
        self.events.publish(RegistryEvent::TagsUpdated {
            identity: model_identity.to_string(),
        });
        Ok(merged)
    }

    /// Snapshot of registry counters.
    pub fn stats(&self) -> RegistryStats {
        let inner = self.inner.lock().unwrap();
        let mut stats = RegistryStats {
            models: inner.records.len(),
            deployments_total: 0,
            deployments_in_flight: 0,
            deployments_succeeded: 0,
            deployments_failed: 0,
        };
        for record in inner.records.values() {
            for deployment in &record.deployments {
                stats.deployments_total += 1;
                match deployment.status {
                    DeploymentStatus::Deploying => stats.deployments_in_flight += 1,
                    DeploymentStatus::Succeeded => stats.deployments_succeeded += 1,
                    DeploymentStatus::Failed { .. } => stats.deployments_failed += 1,
                }
            }
        }
        stats
    }

    /// Schedule the simulated completion: after the configured delay the
    /// deployment transitions to `Succeeded` unless it already reached a
    /// terminal state through `resolve_deployment`.
    fn schedule_completion(&self, model_identity: String, deployment_id: String) {
        let inner = Arc::clone(&self.inner);
        let events = Arc::clone(&self.events);
        let delay = self.config.completion_delay;

        thread::spawn(move || {
            thread::sleep(delay);
            let snapshot = {
                let mut guard = inner.lock().unwrap();
                guard.transition(&model_identity, &deployment_id, DeploymentStatus::Succeeded)
            };
            if let Some(deployment) = snapshot {
                info!("Deployment {} completed: succeeded", deployment_id);
                events.publish(RegistryEvent::DeploymentCompleted {
                    deployment_id,
                    model_identity,
                    status: deployment.status,
                });
            }
        });
    }

    fn model_reference_uri(&self, identity: &str, version: &str) -> String {
        format!(
            "{}/models/{}/versions/{}",
            self.config.base_uri, identity, version
        )
    }

    fn synthesized_endpoint(&self, endpoint_id: &str) -> EndpointDescriptor {
        EndpointDescriptor {
            scoring_uri: format!("{}/endpoints/{}/score", self.config.base_uri, endpoint_id),
            auth_mode: "key".to_string(),
            swagger_uri: format!(
                "{}/endpoints/{}/swagger.json",
                self.config.base_uri, endpoint_id
            ),
        }
    }

    /// Stub record for placeholder miss mode. Clearly synthetic: fresh
    /// identity, no metrics, no deployments.
    fn placeholder_record(&self, name: &str, version: Option<&str>) -> ModelRecord {
        let version = version.unwrap_or(DEFAULT_VERSION).to_string();
        let now = now_millis();
        ModelRecord {
            identity: Uuid::new_v4().to_string(),
            name: name.to_string(),
            artifact_uri: format!(
                "{}/artifacts/{}/{}/download",
                self.config.base_uri, name, version
            ),
            version,
            description: None,
            tags: HashMap::new(),
            framework: Framework::Custom,
            metrics: None,
            status: ModelStatus::Ready,
            registered_at: now,
            last_modified: now,
            deployments: Vec::new(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the record matching an explicit version, or the highest version
/// when none is requested. Later registrations win ties.
fn select_version<'a>(
    candidates: &[&'a ModelRecord],
    requested: Option<&str>,
) -> Option<&'a ModelRecord> {
    match requested {
        Some(version) => candidates
            .iter()
            .rev()
            .find(|r| r.version == version)
            .copied(),
        None => {
            let mut best: Option<&ModelRecord> = None;
            for candidate in candidates.iter().copied() {
                match best {
                    Some(current)
                        if compare_versions(&candidate.version, &current.version)
                            == Ordering::Less => {}
                    _ => best = Some(candidate),
                }
            }
            best
        }
    }
}

/// Current time as epoch milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
