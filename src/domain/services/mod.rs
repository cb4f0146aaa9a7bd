//! Domain Services
//!
//! Stateless, I/O-free logic operating on domain entities.

mod planner;
mod render;

pub use planner::{PlanBuilder, PlannerSettings, COMPOSE_DESCRIPTOR, ENV_FILE};
pub use render::{render_compose, render_env_file, COMPOSE_VERSION, RESTART_POLICY};
