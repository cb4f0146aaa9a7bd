//! Plan Executor
//!
//! Applies a [`DeploymentPlan`] step by step against a [`RemoteSurface`].
//!
//! - Fail-fast: the first failed step halts the plan; later steps are never
//!   invoked and earlier ones are not rolled back.
//! - Run-command steps may be retried with linear backoff.
//! - Dry run performs no I/O and marks every step skipped.
//! - A [`CancellationToken`] is checked before every step.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::domain::entities::{
    repository_sync_argv, DeploymentPlan, ExecutionResult, PlanStep, StepOutcome, StepStatus,
};
use crate::domain::ports::{DeployEvent, DeployEventSink, NoopEventSink, RemoteSurface};

const DRY_RUN_REASON: &str = "dry run";
const CANCELLED_REASON: &str = "cancelled";

/// Shared flag that stops a running plan before its next step
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Executor policies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorOptions {
    pub dry_run: bool,
    /// Extra attempts for failed run-command steps
    pub retries: u32,
    /// Delay before retry N is `N * retry_backoff`
    pub retry_backoff: Duration,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            retries: 0,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

impl ExecutorOptions {
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}

/// Applies plans
#[derive(Clone)]
pub struct Executor {
    options: ExecutorOptions,
    cancel: CancellationToken,
    events: Arc<dyn DeployEventSink>,
}

impl Executor {
    pub fn new(options: ExecutorOptions) -> Self {
        Self {
            options,
            cancel: CancellationToken::new(),
            events: Arc::new(NoopEventSink),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Apply `plan` against `surface`
    ///
    /// Never returns early with an error: every outcome, including the
    /// failing step, is recorded in the returned result.
    pub fn apply(&self, plan: &DeploymentPlan, surface: &dyn RemoteSurface) -> ExecutionResult {
        let total = plan.len();
        let mut result = ExecutionResult::new(
            plan.service(),
            plan.target().destination(),
            self.options.dry_run,
        );

        tracing::info!(
            service = plan.service(),
            target = %surface.describe(),
            steps = total,
            dry_run = self.options.dry_run,
            "applying plan"
        );

        for (position, step) in plan.steps().iter().enumerate() {
            let index = position + 1;

            if self.cancel.is_cancelled() {
                let remaining = total - position;
                tracing::warn!(service = plan.service(), remaining, "deployment cancelled");
                self.events.on_event(DeployEvent::Cancelled { remaining });
                self.fail(&mut result, index, step, CANCELLED_REASON.to_string(), 0, 0);
                return self.finish(result, remaining - 1);
            }

            self.events.on_event(DeployEvent::StepStarted {
                index,
                total,
                description: step.describe(),
            });

            if self.options.dry_run {
                result.record(outcome(index, step, StepStatus::Skipped(DRY_RUN_REASON.to_string()), 0, 0));
                self.events.on_event(DeployEvent::StepSkipped {
                    index,
                    reason: DRY_RUN_REASON.to_string(),
                });
                continue;
            }

            let started = Instant::now();
            let (status, attempts) = self.run_step(index, step, surface);
            let duration_ms = started.elapsed().as_millis() as u64;

            match status {
                Ok(()) => {
                    tracing::debug!(index, kind = step.kind(), duration_ms, "step succeeded");
                    result.record(outcome(index, step, StepStatus::Succeeded, attempts, duration_ms));
                    self.events
                        .on_event(DeployEvent::StepSucceeded { index, duration_ms });
                }
                Err(reason) => {
                    tracing::warn!(index, kind = step.kind(), %reason, "step failed");
                    self.fail(&mut result, index, step, reason, attempts, duration_ms);
                    return self.finish(result, total - index);
                }
            }
        }

        self.finish(result, 0)
    }

    fn fail(
        &self,
        result: &mut ExecutionResult,
        index: usize,
        step: &PlanStep,
        reason: String,
        attempts: u32,
        duration_ms: u64,
    ) {
        result.record(outcome(
            index,
            step,
            StepStatus::Failed(reason.clone()),
            attempts,
            duration_ms,
        ));
        self.events.on_event(DeployEvent::StepFailed { index, reason });
    }

    fn finish(&self, mut result: ExecutionResult, not_run: usize) -> ExecutionResult {
        result.finish(not_run);
        self.events.on_event(DeployEvent::Completed {
            service: result.service.clone(),
            success: result.is_success(),
            succeeded: result.succeeded_count(),
            failed: result.steps.iter().filter(|s| s.status.is_failed()).count(),
            not_run,
        });
        result
    }

    /// Run one step with the retry policy; returns the status and attempts made
    fn run_step(
        &self,
        index: usize,
        step: &PlanStep,
        surface: &dyn RemoteSurface,
    ) -> (Result<(), String>, u32) {
        let max_attempts = if step.runs_command() {
            self.options.retries.saturating_add(1)
        } else {
            1
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match perform(step, surface) {
                Ok(()) => return (Ok(()), attempt),
                Err(reason) if attempt < max_attempts && !self.cancel.is_cancelled() => {
                    tracing::info!(index, attempt, %reason, "retrying step");
                    self.events.on_event(DeployEvent::StepRetrying {
                        index,
                        attempt,
                        reason,
                    });
                    thread::sleep(self.options.retry_backoff * attempt);
                }
                Err(reason) => return (Err(reason), attempt),
            }
        }
    }
}

fn outcome(
    index: usize,
    step: &PlanStep,
    status: StepStatus,
    attempts: u32,
    duration_ms: u64,
) -> StepOutcome {
    StepOutcome {
        index,
        kind: step.kind(),
        description: step.describe(),
        status,
        attempts,
        duration_ms,
    }
}

/// Apply a single step once; the error is a one-line failure reason
fn perform(step: &PlanStep, surface: &dyn RemoteSurface) -> Result<(), String> {
    match step {
        PlanStep::EnsureDirectory { path } => {
            surface.ensure_directory(path).map_err(|e| e.to_string())
        }
        PlanStep::WriteFile { path, content } => {
            surface.write_file(path, content).map_err(|e| e.to_string())
        }
        PlanStep::RunCommand { argv, workdir } => run_checked(surface, argv, workdir.as_deref()),
        PlanStep::SyncRepository {
            repository,
            checkout,
        } => {
            let present = surface
                .exists(&checkout.join(".git"))
                .map_err(|e| e.to_string())?;
            let argv = repository_sync_argv(repository, checkout, present);
            run_checked(surface, &argv, None)
        }
    }
}

fn run_checked(
    surface: &dyn RemoteSurface,
    argv: &[String],
    workdir: Option<&Path>,
) -> Result<(), String> {
    let output = surface
        .run_command(argv, workdir)
        .map_err(|e| e.to_string())?;
    if output.is_success() {
        return Ok(());
    }
    Err(match output.stderr_tail() {
        Some(tail) => format!("exit code {}: {}", output.exit_code, tail),
        None => format!("exit code {}", output.exit_code),
    })
}
