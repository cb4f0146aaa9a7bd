use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::Orchestrator;
use crate::application::{Executor, ExecutorOptions, SecretProvider};
use crate::config::ConfigStore;
use crate::domain::entities::{DeployTarget, StepStatus};
use crate::domain::ports::{DeployEvent, DeployEventSink};
use crate::domain::services::PlanBuilder;
use crate::error::ErrorKind;
use crate::infrastructure::{MockSurface, MockSurfaceFactory, StaticSecretBackend, SurfaceCall};

const DOC: &str = r#"
services:
  - name: billing
    type: service
    host: 10.0.0.5
    port: 8080
    requires_secrets: true
  - name: web
    type: service
    host: web.internal
  - name: stack
    type: platform
    repository: https://github.com/acme/stack.git
    compose_file: docker-compose.prod.yml
    requires_secrets: true
"#;

#[derive(Default)]
struct RecordingSink(Mutex<Vec<DeployEvent>>);

impl DeployEventSink for RecordingSink {
    fn on_event(&self, event: DeployEvent) {
        self.0.lock().unwrap().push(event);
    }
}

struct Fixture {
    backend: Arc<StaticSecretBackend>,
    surface: MockSurface,
    factory: MockSurfaceFactory,
    events: Arc<RecordingSink>,
    orchestrator: Orchestrator,
}

fn fixture_with(surface: MockSurface, options: ExecutorOptions) -> Fixture {
    let backend = Arc::new(
        StaticSecretBackend::new()
            .with_secret("billing", "DB_PASSWORD", "hunter2")
            .with_secret("billing", "API_KEY", "k-123")
            .with_secret("stack", "POSTGRES_PASSWORD", "pg pass"),
    );
    let factory = MockSurfaceFactory::new(surface.clone());
    let events = Arc::new(RecordingSink::default());
    let orchestrator = Orchestrator::new(
        SecretProvider::new(backend.clone()),
        PlanBuilder::default(),
        Box::new(factory.clone()),
        Executor::new(options),
    )
    .with_events(events.clone());

    Fixture {
        backend,
        surface,
        factory,
        events,
        orchestrator,
    }
}

fn fixture() -> Fixture {
    fixture_with(
        MockSurface::new("mock"),
        ExecutorOptions::default().with_retry_backoff(Duration::ZERO),
    )
}

fn store() -> ConfigStore {
    ConfigStore::from_yaml_str("deployments.yml", DOC).unwrap()
}

#[test]
fn service_deploy_end_to_end() {
    let f = fixture();
    let result = f.orchestrator.deploy(&store(), "billing").unwrap();

    assert!(result.is_success());
    assert_eq!(result.target, "admin@10.0.0.5");
    assert_eq!(result.steps.len(), 4);

    let compose = f
        .surface
        .file("/opt/deployments/billing/docker-compose.yml")
        .expect("compose descriptor written");
    let doc: serde_yaml_ng::Value = serde_yaml_ng::from_str(&compose).unwrap();
    let svc = &doc["services"]["billing"];
    assert_eq!(svc["ports"][0].as_str(), Some("8080:8080"));
    assert_eq!(svc["restart"].as_str(), Some("always"));
    assert_eq!(svc["environment"]["DB_PASSWORD"].as_str(), Some("hunter2"));

    assert_eq!(
        f.factory.targets(),
        vec![DeployTarget::Remote {
            user: "admin".to_string(),
            host: "10.0.0.5".to_string(),
        }]
    );
}

#[test]
fn service_without_secrets_never_calls_backend() {
    let f = fixture();
    let result = f.orchestrator.deploy(&store(), "web").unwrap();

    assert!(result.is_success());
    assert_eq!(f.backend.calls(), 0);
    let compose = f
        .surface
        .file("/opt/deployments/web/docker-compose.yml")
        .unwrap();
    let doc: serde_yaml_ng::Value = serde_yaml_ng::from_str(&compose).unwrap();
    let env = doc["services"]["web"]["environment"].as_mapping().unwrap();
    assert!(env.is_empty());

    let events = f.events.0.lock().unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, DeployEvent::SecretsNotRequired { .. })));
}

#[test]
fn platform_deploy_clones_exact_repository() {
    let f = fixture();
    let result = f.orchestrator.deploy(&store(), "stack").unwrap();

    assert!(result.is_success());
    assert_eq!(
        f.surface.calls()[0],
        SurfaceCall::RunCommand(vec![
            "git".to_string(),
            "clone".to_string(),
            "--".to_string(),
            "https://github.com/acme/stack.git".to_string(),
            "stack".to_string(),
        ])
    );
    assert_eq!(
        f.surface.file(Path::new("stack/.env")).as_deref(),
        Some("POSTGRES_PASSWORD=\"pg pass\"\n")
    );
    assert_eq!(f.factory.targets(), vec![DeployTarget::Local]);
}

#[test]
fn unknown_service_is_not_found() {
    let f = fixture();
    let err = f.orchestrator.deploy(&store(), "ghost").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(
        err.to_string(),
        "Service \"ghost\" not found in deployments.yml"
    );
    assert!(f.surface.calls().is_empty());
}

#[test]
fn secret_failure_stops_before_any_io() {
    let surface = MockSurface::new("mock");
    let orchestrator = Orchestrator::new(
        SecretProvider::new(Arc::new(StaticSecretBackend::unavailable("vault sealed"))),
        PlanBuilder::default(),
        Box::new(MockSurfaceFactory::new(surface.clone())),
        Executor::new(ExecutorOptions::default()),
    );

    let err = orchestrator.deploy(&store(), "billing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SecretBackend);
    assert!(surface.calls().is_empty());
}

#[test]
fn step_failure_is_recorded_in_result() {
    let f = fixture_with(
        MockSurface::new("mock").fail_call(3, 1, "manifest unknown"),
        ExecutorOptions::default(),
    );
    let result = f.orchestrator.deploy(&store(), "billing").unwrap();

    assert!(!result.is_success());
    assert_eq!(result.steps.len(), 3);
    assert_eq!(
        result.steps[2].status,
        StepStatus::Failed("exit code 1: manifest unknown".to_string())
    );
    assert_eq!(result.not_run, 1);
    assert_eq!(result.ensure_success().unwrap_err().kind(), ErrorKind::StepFailure);
}

#[test]
fn each_run_resolves_secrets_again() {
    let f = fixture();
    f.orchestrator.deploy(&store(), "billing").unwrap();
    f.backend.set("billing", "API_KEY", "rotated");
    f.orchestrator.deploy(&store(), "billing").unwrap();

    assert_eq!(f.backend.calls(), 2);
    let compose = f
        .surface
        .file("/opt/deployments/billing/docker-compose.yml")
        .unwrap();
    assert!(compose.contains("rotated"));
}

#[test]
fn events_never_carry_secret_values() {
    let f = fixture();
    f.orchestrator.deploy(&store(), "billing").unwrap();

    let events = f.events.0.lock().unwrap();
    let dump = format!("{:?}", *events);
    assert!(!dump.contains("hunter2"));
    assert!(!dump.contains("k-123"));
    assert!(dump.contains("DB_PASSWORD"));
}

#[test]
fn run_loads_document_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("deployments.yml");
    std::fs::write(&path, DOC).unwrap();

    let f = fixture_with(
        MockSurface::new("mock"),
        ExecutorOptions::default().with_dry_run(true),
    );
    let result = f.orchestrator.run("billing", &path).unwrap();

    assert!(result.is_success());
    assert!(result.dry_run);
    assert!(f.surface.calls().is_empty());
}

#[test]
fn missing_document_is_config_error() {
    let f = fixture();
    let err = f
        .orchestrator
        .run("billing", Path::new("/nonexistent/deployments.yml"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
