//! Execution Result Entity
//!
//! Per-step outcomes of applying a plan. The overall status is failed if and
//! only if at least one recorded step failed; steps after a failure are never
//! recorded because they never ran.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ShipwrightError, ShipwrightResult};

/// Outcome of a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Failed(String),
    /// Not performed (dry run)
    Skipped(String),
}

impl StepStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepStatus::Failed(_))
    }
}

/// Record for one executed (or skipped) step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// 1-based position in the plan
    pub index: usize,
    pub kind: &'static str,
    /// Secret-free description of the step
    pub description: String,
    #[serde(flatten)]
    pub status: StepStatus,
    /// Number of attempts made (0 for skipped steps)
    pub attempts: u32,
    pub duration_ms: u64,
}

/// Terminal value of one deployment
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub service: String,
    pub target: String,
    pub dry_run: bool,
    pub steps: Vec<StepOutcome>,
    /// Plan steps never reached (fail-fast or cancellation)
    pub not_run: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionResult {
    pub fn new(service: impl Into<String>, target: impl Into<String>, dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            service: service.into(),
            target: target.into(),
            dry_run,
            steps: Vec::new(),
            not_run: 0,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn record(&mut self, outcome: StepOutcome) {
        self.steps.push(outcome);
    }

    pub fn finish(&mut self, not_run: usize) {
        self.not_run = not_run;
        self.finished_at = Utc::now();
    }

    pub fn is_success(&self) -> bool {
        !self.steps.iter().any(|s| s.status.is_failed())
    }

    /// The step that halted the plan, if any
    pub fn failure(&self) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.status.is_failed())
    }

    pub fn succeeded_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Succeeded)
            .count()
    }

    /// Convert a failed result into a `StepFailure` error
    pub fn ensure_success(&self) -> ShipwrightResult<()> {
        match self.failure() {
            None => Ok(()),
            Some(step) => {
                let reason = match &step.status {
                    StepStatus::Failed(reason) => reason.clone(),
                    _ => String::new(),
                };
                Err(ShipwrightError::StepFailure {
                    index: step.index,
                    step: step.description.clone(),
                    reason,
                })
            }
        }
    }
}
