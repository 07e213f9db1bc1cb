//! Model records and the trained-model contract.
//!
//! This module provides:
//! - `TrainedModel`: the capability the registry consumes from a model producer
//! - `Framework`: closed classification over recognized model kinds
//! - `ModelRecord`: one registered model version and its deployment history
//! - `RegistrationMetadata` / `RegistrationReceipt`: register() input and output

use crate::deployment::Deployment;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Version assigned when the caller supplies none.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// The capability a model producer exposes to the registry.
///
/// The registry never interprets the artifact payload and never runs
/// inference; it consumes exactly three things from the producer: the
/// trained predicate, a kind tag for framework classification, and an
/// optional metrics payload from the last training run.
pub trait TrainedModel {
    /// Whether training has completed. `register` hard-fails when false.
    fn is_trained(&self) -> bool;

    /// Runtime kind tag (e.g. "sklearn", "tensorflow"). Unrecognized tags
    /// classify as [`Framework::Custom`].
    fn kind(&self) -> &str;

    /// Opaque reference to the serialized artifact. Stored verbatim.
    fn artifact_uri(&self) -> String;

    /// Metrics from the most recent training run, if the producer kept them.
    fn last_training_results(&self) -> Option<HashMap<String, f64>>;
}

/// Framework classification derived from a model's kind tag at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    Sklearn,
    #[serde(rename = "tensorflow")]
    TensorFlow,
    #[serde(rename = "pytorch")]
    PyTorch,
    Onnx,
    #[serde(rename = "xgboost")]
    XgBoost,
    /// Anything outside the recognized set.
    Custom,
}

impl Framework {
    /// Classify a kind tag. The set is closed; unknown tags map to `Custom`.
    pub fn classify(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "sklearn" | "scikit-learn" => Framework::Sklearn,
            "tensorflow" | "keras" => Framework::TensorFlow,
            "pytorch" | "torch" => Framework::PyTorch,
            "onnx" => Framework::Onnx,
            "xgboost" => Framework::XgBoost,
            _ => Framework::Custom,
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Framework::Sklearn => "sklearn",
            Framework::TensorFlow => "tensorflow",
            Framework::PyTorch => "pytorch",
            Framework::Onnx => "onnx",
            Framework::XgBoost => "xgboost",
            Framework::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle status of a registered model.
///
/// Records are stored as `Registered`; `get` presents them as `Ready`
/// (see `Registry::get` for the normalization rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Registered,
    Ready,
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStatus::Registered => write!(f, "registered"),
            ModelStatus::Ready => write!(f, "ready"),
        }
    }
}

/// One registered model version.
///
/// Owned exclusively by the registry for its lifetime; never deleted.
/// Deployments are append-only and reference their model by identity,
/// never by embedded pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Opaque unique key, stable for the lifetime of the record.
    pub identity: String,
    /// Logical model name; multiple versions may share it.
    pub name: String,
    /// Semantic version string.
    pub version: String,
    pub description: Option<String>,
    /// Merge-updatable key/value tags.
    pub tags: HashMap<String, String>,
    /// Opaque reference to the trained artifact. Uninterpreted.
    pub artifact_uri: String,
    pub framework: Framework,
    /// `None` means no metrics were recorded at registration. The registry
    /// never synthesizes metric values.
    pub metrics: Option<HashMap<String, f64>>,
    pub status: ModelStatus,
    /// Epoch milliseconds.
    pub registered_at: u64,
    /// Epoch milliseconds, bumped on tag updates and deployments.
    pub last_modified: u64,
    /// Append-only deployment history, oldest first.
    pub deployments: Vec<Deployment>,
}

/// Caller-supplied metadata for `register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationMetadata {
    pub name: String,
    /// Defaults to [`DEFAULT_VERSION`] when absent.
    pub version: Option<String>,
    pub description: Option<String>,
    pub tags: HashMap<String, String>,
}

impl RegistrationMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// What `register` hands back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub identity: String,
    pub name: String,
    pub version: String,
    pub status: ModelStatus,
    /// Registry-reference URI for the new record.
    pub reference_uri: String,
    /// Always empty at registration time.
    pub deployments: Vec<Deployment>,
}

/// Compare two version strings component-wise.
///
/// Dot-separated components compare numerically when both parse, falling
/// back to lexicographic comparison otherwise. Missing components count
/// as zero, so "1.0" == "1.0.0".
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parts_a: Vec<&str> = a.split('.').collect();
    let parts_b: Vec<&str> = b.split('.').collect();
    let len = parts_a.len().max(parts_b.len());

    for i in 0..len {
        let pa = parts_a.get(i).copied().unwrap_or("0");
        let pb = parts_b.get(i).copied().unwrap_or("0");
        let ord = match (pa.parse::<u64>(), pb.parse::<u64>()) {
            (Ok(na), Ok(nb)) => na.cmp(&nb),
            _ => pa.cmp(pb),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
