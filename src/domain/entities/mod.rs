//! Domain Entities

mod execution;
mod plan;
mod secret_bundle;
mod service;

pub use execution::{ExecutionResult, StepOutcome, StepStatus};
pub use plan::{repository_sync_argv, DeployTarget, DeploymentPlan, PlanStep};
pub use secret_bundle::SecretBundle;
pub use service::{
    check_not_option, check_service_name, env_identifier, ServiceDefinition, DEFAULT_COMPOSE_FILE,
};
