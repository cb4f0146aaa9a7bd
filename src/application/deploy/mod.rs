//! Deploy Module
//!
//! Resolves one declared service into an applied deployment.
//!
//! ## Structure
//!
//! - `orchestrator` - the deploy use case (`Orchestrator`)
//!
//! ## Usage
//!
//! ```ignore
//! use shipwright::application::{Executor, ExecutorOptions, Orchestrator, SecretProvider};
//!
//! let orchestrator = Orchestrator::new(secrets, PlanBuilder::default(), surfaces, executor);
//! let result = orchestrator.run("billing", Path::new("deployments.yml"))?;
//! result.ensure_success()?;
//! ```

mod orchestrator;

pub use orchestrator::Orchestrator;

#[cfg(test)]
mod tests;
