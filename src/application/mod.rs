//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `Orchestrator` - config → secrets → plan → execute for one service
//!
//! ## Services
//!
//! - `SecretProvider` - validated, uncached secret resolution
//! - `Executor` - fail-fast plan application with retry, dry run, cancellation

pub mod deploy;
pub mod executor;
pub mod secrets;

pub use deploy::Orchestrator;
pub use executor::{CancellationToken, Executor, ExecutorOptions};
pub use secrets::SecretProvider;
