//! End-to-end lifecycle tests: register, deploy, observe completion.

use modelyard::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

struct SensorModel {
    trained: bool,
}

impl TrainedModel for SensorModel {
    fn is_trained(&self) -> bool {
        self.trained
    }

    fn kind(&self) -> &str {
        "tensorflow"
    }

    fn artifact_uri(&self) -> String {
        "blob://artifacts/temp-sensor/model.pb".to_string()
    }

    fn last_training_results(&self) -> Option<HashMap<String, f64>> {
        Some(HashMap::from([
            ("accuracy".to_string(), 0.97),
            ("loss".to_string(), 0.08),
        ]))
    }
}

fn fast_registry() -> Registry {
    Registry::with_config(
        RegistryConfig::default().with_completion_delay(Duration::from_millis(20)),
    )
}

#[test]
fn temp_sensor_scenario() {
    // Register with no explicit version, deploy with a partial config,
    // and watch the deployment settle.
    let registry = fast_registry();

    let receipt = registry
        .register(
            &SensorModel { trained: true },
            RegistrationMetadata::new("temp-sensor").with_description("edge temperature model"),
        )
        .expect("registration should succeed");
    assert_eq!(receipt.version, "1.0.0");
    assert_eq!(receipt.status, ModelStatus::Registered);

    let deployment = registry
        .deploy(
            &receipt.identity,
            DeploymentConfig::default().with_instance_count(2),
        )
        .expect("deploy should succeed");
    assert_eq!(deployment.status, DeploymentStatus::Deploying);
    assert_eq!(deployment.instances.instance_count, 2);
    assert_eq!(deployment.instances.instance_type, "Standard_DS3_v2");

    std::thread::sleep(Duration::from_millis(150));

    let record = registry
        .get("temp-sensor", None)
        .expect("model should be visible after registration");
    assert_eq!(record.status, ModelStatus::Ready);
    assert_eq!(record.framework, Framework::TensorFlow);
    assert_eq!(record.deployments.len(), 1);
    assert_eq!(record.deployments[0].status, DeploymentStatus::Succeeded);
}

#[test]
fn completion_is_observable_through_events() {
    let registry = fast_registry();
    let events = registry.events().subscribe();

    let receipt = registry
        .register(
            &SensorModel { trained: true },
            RegistrationMetadata::new("streamed"),
        )
        .unwrap();
    let deployment = registry
        .deploy(&receipt.identity, DeploymentConfig::default())
        .unwrap();

    // Registration and deployment-start events arrive synchronously.
    assert!(matches!(
        events.recv().unwrap(),
        RegistryEvent::ModelRegistered { .. }
    ));
    match events.recv().unwrap() {
        RegistryEvent::DeploymentStarted { deployment_id, .. } => {
            assert_eq!(deployment_id, deployment.deployment_id);
        }
        other => panic!("expected DeploymentStarted, got {:?}", other),
    }

    // Completion arrives from the background task.
    match events.recv().unwrap() {
        RegistryEvent::DeploymentCompleted {
            deployment_id,
            model_identity,
            status,
        } => {
            assert_eq!(deployment_id, deployment.deployment_id);
            assert_eq!(model_identity, receipt.identity);
            assert_eq!(status, DeploymentStatus::Succeeded);
        }
        other => panic!("expected DeploymentCompleted, got {:?}", other),
    }
}

#[test]
fn untrained_model_is_rejected_before_any_state_change() {
    let registry = fast_registry();
    let err = registry
        .register(
            &SensorModel { trained: false },
            RegistrationMetadata::new("temp-sensor"),
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotTrained(_)));
    assert!(registry.list(&ModelFilter::default()).is_empty());
    assert!(matches!(
        registry.get("temp-sensor", None),
        Err(RegistryError::ModelNotFound(_))
    ));
}

#[test]
fn tag_merge_and_metrics_across_the_lifecycle() {
    let registry = fast_registry();
    let receipt = registry
        .register(
            &SensorModel { trained: true },
            RegistrationMetadata::new("temp-sensor").with_tag("stage", "dev"),
        )
        .unwrap();

    let merged = registry
        .update_tags(
            &receipt.identity,
            HashMap::from([("stage".to_string(), "prod".to_string())]),
        )
        .unwrap();
    assert_eq!(merged.get("stage").map(String::as_str), Some("prod"));

    let metrics = registry.get_metrics(&receipt.identity).unwrap();
    assert_eq!(metrics.get("accuracy"), Some(&0.97));
    assert_eq!(metrics.get("loss"), Some(&0.08));
}

#[test]
fn records_serialize_to_stable_json_shape() {
    let registry = fast_registry();
    registry
        .register(
            &SensorModel { trained: true },
            RegistrationMetadata::new("temp-sensor").with_version("2.0.0"),
        )
        .unwrap();

    let record = registry.get("temp-sensor", Some("2.0.0")).unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["name"], "temp-sensor");
    assert_eq!(json["version"], "2.0.0");
    assert_eq!(json["framework"], "tensorflow");
    assert_eq!(json["status"], "ready");
    assert!(json["deployments"].as_array().unwrap().is_empty());
}

#[test]
fn failed_deployment_is_terminal_and_counted() {
    let registry = Registry::with_config(
        RegistryConfig::default().with_completion_delay(Duration::from_secs(60)),
    );
    let receipt = registry
        .register(
            &SensorModel { trained: true },
            RegistrationMetadata::new("temp-sensor"),
        )
        .unwrap();
    let deployment = registry
        .deploy(&receipt.identity, DeploymentConfig::default())
        .unwrap();

    let failed = registry
        .resolve_deployment(
            &deployment.deployment_id,
            DeploymentOutcome::Failed {
                reason: "backend rejected image".to_string(),
            },
        )
        .unwrap();
    assert!(failed.status.is_terminal());

    let stats = registry.stats();
    assert_eq!(stats.deployments_failed, 1);
    assert_eq!(stats.deployments_in_flight, 0);

    assert!(matches!(
        registry.resolve_deployment(&deployment.deployment_id, DeploymentOutcome::Succeeded),
        Err(RegistryError::DeploymentComplete(_))
    ));
}
