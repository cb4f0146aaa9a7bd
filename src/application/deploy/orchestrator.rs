//! Deploy Use Case
//!
//! Drives the deployment flow:
//! 1. Load the deployments document
//! 2. Find the requested service
//! 3. Resolve secrets (only when the service requires them)
//! 4. Build the plan
//! 5. Apply it on the surface chosen for the plan's target
//!
//! The orchestrator holds no process-wide state; every `run` is
//! independent and can be called repeatedly.

use std::path::Path;
use std::sync::Arc;

use crate::application::executor::Executor;
use crate::application::secrets::SecretProvider;
use crate::config::ConfigStore;
use crate::domain::entities::{DeploymentPlan, ExecutionResult, SecretBundle, ServiceDefinition};
use crate::domain::ports::{DeployEvent, DeployEventSink, NoopEventSink, SurfaceFactory};
use crate::domain::services::PlanBuilder;
use crate::error::ShipwrightResult;

/// Deploy use case
pub struct Orchestrator {
    secrets: SecretProvider,
    planner: PlanBuilder,
    surfaces: Box<dyn SurfaceFactory>,
    executor: Executor,
    events: Arc<dyn DeployEventSink>,
}

impl Orchestrator {
    pub fn new(
        secrets: SecretProvider,
        planner: PlanBuilder,
        surfaces: Box<dyn SurfaceFactory>,
        executor: Executor,
    ) -> Self {
        Self {
            secrets,
            planner,
            surfaces,
            executor,
            events: Arc::new(NoopEventSink),
        }
    }

    /// Report progress to `events` (the executor included)
    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.executor = self.executor.with_events(events.clone());
        self.events = events;
        self
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Load `config_path` and deploy `service_name`
    ///
    /// Configuration, lookup, secret and planning problems are errors. A
    /// failed step is not: the returned result records it, and
    /// [`ExecutionResult::ensure_success`] turns it into a `StepFailure`.
    pub fn run(&self, service_name: &str, config_path: &Path) -> ShipwrightResult<ExecutionResult> {
        let store = ConfigStore::load(config_path)?;
        self.deploy(&store, service_name)
    }

    /// Deploy `service_name` from an already loaded document
    pub fn deploy(&self, store: &ConfigStore, service_name: &str) -> ShipwrightResult<ExecutionResult> {
        let plan = self.plan(store, service_name)?;
        let surface = self.surfaces.surface_for(plan.target());
        Ok(self.executor.apply(&plan, surface.as_ref()))
    }

    /// Everything up to (not including) execution
    pub fn plan(&self, store: &ConfigStore, service_name: &str) -> ShipwrightResult<DeploymentPlan> {
        for warning in store.warnings() {
            tracing::debug!("{}", warning);
        }
        self.events.on_event(DeployEvent::ConfigLoaded {
            path: store.path().to_path_buf(),
            service_count: store.services().len(),
            warnings: store.warnings().iter().map(ToString::to_string).collect(),
        });

        let service = store.find(service_name)?;
        tracing::info!(
            service = %service.name,
            kind = %service.service_type,
            "resolved service"
        );
        self.events.on_event(DeployEvent::ServiceResolved {
            service: service.clone(),
        });

        let secrets = self.secrets_for(service)?;
        let plan = self.planner.build(service, &secrets)?;

        let fingerprint = plan.fingerprint();
        tracing::debug!(
            service = %service.name,
            target = %plan.target(),
            fingerprint = %fingerprint.short(),
            "plan built"
        );
        self.events.on_event(DeployEvent::PlanBuilt {
            service: plan.service().to_string(),
            target: plan.target().destination(),
            steps: plan.steps().iter().map(|s| s.describe()).collect(),
            fingerprint: fingerprint.short().to_string(),
        });

        Ok(plan)
    }

    fn secrets_for(&self, service: &ServiceDefinition) -> ShipwrightResult<SecretBundle> {
        if !service.requires_secrets {
            self.events.on_event(DeployEvent::SecretsNotRequired {
                service: service.name.clone(),
            });
            return Ok(SecretBundle::empty());
        }

        let bundle = self.secrets.resolve(&service.name)?;
        self.events.on_event(DeployEvent::SecretsResolved {
            service: service.name.clone(),
            backend: self.secrets.backend_name().to_string(),
            keys: bundle.keys(),
        });
        Ok(bundle)
    }
}
