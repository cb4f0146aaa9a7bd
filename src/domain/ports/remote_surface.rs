//! RemoteSurface port - where commands and files are applied
//!
//! Implementations:
//! - `SshSurface` - a host reached over SSH
//! - `LocalSurface` - the orchestrating machine
//! - `MockSurface` - in-memory recorder for tests

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::domain::entities::DeployTarget;

/// Result type for surface operations
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Captured output of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Last non-empty stderr line, for one-line failure reasons
    pub fn stderr_tail(&self) -> Option<&str> {
        self.stderr.lines().rev().map(str::trim).find(|l| !l.is_empty())
    }
}

/// Surface operation errors
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Operation exceeded its time budget and was killed
    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
    /// Program could not be started
    #[error("cannot start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// Remote side reported an error for a filesystem operation
    #[error("{0}")]
    Remote(String),
    /// Empty argv
    #[error("empty command")]
    EmptyCommand,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability to apply plan steps somewhere
///
/// `ensure_directory` and `write_file` must be idempotent: an existing
/// directory is fine, an existing file is overwritten.
pub trait RemoteSurface {
    /// Where this surface applies changes (`admin@host`, `local`)
    fn describe(&self) -> String;

    /// Whether `path` exists (file or directory)
    fn exists(&self, path: &Path) -> SurfaceResult<bool>;

    fn ensure_directory(&self, path: &Path) -> SurfaceResult<()>;

    fn write_file(&self, path: &Path, content: &str) -> SurfaceResult<()>;

    /// Run `argv`; a non-zero exit is reported in the output, not as an error
    fn run_command(&self, argv: &[String], workdir: Option<&Path>) -> SurfaceResult<CommandOutput>;
}

/// Picks the surface for a plan target
pub trait SurfaceFactory {
    fn surface_for(&self, target: &DeployTarget) -> Box<dyn RemoteSurface>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_tail_skips_blank_lines() {
        let out = CommandOutput::failure(1, "warning: x\nerror: pull access denied\n\n");
        assert_eq!(out.stderr_tail(), Some("error: pull access denied"));
    }

    #[test]
    fn timeout_display() {
        let err = SurfaceError::TimedOut(Duration::from_secs(30));
        assert_eq!(err.to_string(), "timed out after 30s");
    }
}
