//! Deploy Event Port
//!
//! Observable interface for deploy operations. Drives console progress,
//! NDJSON streams for CI, and tests. Events carry secret names, never values.

use std::path::PathBuf;

use crate::domain::entities::ServiceDefinition;

/// Event emitted during a deployment
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// Deployments document loaded
    ConfigLoaded {
        path: PathBuf,
        service_count: usize,
        warnings: Vec<String>,
    },

    /// Requested service found
    ServiceResolved { service: ServiceDefinition },

    /// Secrets fetched (names only)
    SecretsResolved {
        service: String,
        backend: String,
        keys: Vec<String>,
    },

    /// Service does not require secrets; backend not consulted
    SecretsNotRequired { service: String },

    /// Plan built
    PlanBuilt {
        service: String,
        target: String,
        steps: Vec<String>,
        fingerprint: String,
    },

    /// Step about to run
    StepStarted {
        index: usize,
        total: usize,
        description: String,
    },

    /// A failed command attempt will be retried
    StepRetrying {
        index: usize,
        attempt: u32,
        reason: String,
    },

    StepSucceeded { index: usize, duration_ms: u64 },

    StepFailed { index: usize, reason: String },

    /// Step not performed (dry run)
    StepSkipped { index: usize, reason: String },

    /// Cancellation observed; remaining steps were not scheduled
    Cancelled { remaining: usize },

    /// Deployment finished
    Completed {
        service: String,
        success: bool,
        succeeded: usize,
        failed: usize,
        not_run: usize,
    },
}

/// Receives progress from the orchestrator and executor
///
/// Sinks live in infrastructure (console, NDJSON); tests record events.
pub trait DeployEventSink: Send + Sync {
    fn on_event(&self, event: DeployEvent);
}

/// Discards every event
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}
}
