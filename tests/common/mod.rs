//! Common test utilities for Shipwright CLI and scenario tests.
//!
//! - `TestEnv`: isolated working directory and home, plus CLI helpers
//! - Fixtures: reusable deployments documents

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
