//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating the deploy use case with infrastructure dependencies
//! - Output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Command-line definitions
//! - `factory` - Wires settings into an `Orchestrator` (dependency injection)
//! - `output` - Result and error rendering

pub mod cli;
pub mod factory;
pub mod output;

pub use cli::{Cli, ColorWhen, Commands, DeployArgs};
pub use factory::create_orchestrator;
