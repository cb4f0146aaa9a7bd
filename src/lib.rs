//! Shipwright - configuration-driven deployment engine
//!
//! Shipwright resolves a service declared in a deployments document into a
//! concrete plan (directories, rendered files, commands) and applies it to
//! a remote host over SSH or to the local machine, with secrets pulled from
//! a pluggable backend.
//!
//! The crate is layered:
//! - `domain` - entities, value objects, ports and the pure plan builder
//! - `application` - secret provider, executor and the deploy use case
//! - `infrastructure` - SSH/local surfaces, secret backends, event sinks
//! - `config` - deployments document and tool settings
//! - `presentation` - CLI parsing, wiring and output

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{CancellationToken, Executor, ExecutorOptions, Orchestrator, SecretProvider};
pub use config::{ConfigStore, Settings};
pub use domain::entities::{
    DeployTarget, DeploymentPlan, ExecutionResult, PlanStep, SecretBundle, ServiceDefinition,
    StepOutcome, StepStatus,
};
pub use domain::ports::{
    DeployEvent, DeployEventSink, RemoteSurface, SecretBackend, SecretBackendError,
};
pub use domain::services::{PlanBuilder, PlannerSettings};
pub use domain::value_objects::ServiceType;
pub use error::{ErrorKind, ShipwrightError, ShipwrightResult};
