//! Error types for Shipwright
//!
//! Uses `thiserror` for library errors. Every variant belongs to exactly one
//! [`ErrorKind`], which names the stage that failed.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::SecretBackendError;

/// Result type alias for Shipwright operations
pub type ShipwrightResult<T> = Result<T, ShipwrightError>;

/// Coarse classification of a failure, one per deployment stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing configuration; raised before any I/O
    Config,
    /// Requested service is absent from the deployments document
    NotFound,
    /// Secret backend unreachable or denied access
    SecretBackend,
    /// Service type (or shape) the plan builder cannot handle
    UnsupportedServiceType,
    /// A single execution step failed
    StepFailure,
}

impl ErrorKind {
    /// Short stage label used in CLI messages
    pub fn stage(&self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::NotFound => "lookup",
            ErrorKind::SecretBackend => "secrets",
            ErrorKind::UnsupportedServiceType => "plan",
            ErrorKind::StepFailure => "execute",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stage())
    }
}

/// Main error type for Shipwright operations
///
/// Messages never contain secret values; secret backends only report
/// service names and backend diagnostics.
#[derive(Error, Debug)]
pub enum ShipwrightError {
    /// Deployments document could not be read
    #[error("cannot read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Deployments document is not valid YAML or has the wrong shape
    #[error("invalid config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// A single service record failed validation
    #[error("invalid config {path}: services[{position}]: {message}")]
    InvalidRecord {
        path: PathBuf,
        position: usize,
        message: String,
    },

    /// Tool settings file is invalid
    #[error("invalid settings {path}: {message}")]
    Settings { path: PathBuf, message: String },

    /// Requested service does not exist
    #[error("Service \"{name}\" not found in {path}")]
    NotFound { name: String, path: PathBuf },

    /// Secret backend failed for a service
    #[error("cannot resolve secrets for '{service}' via {backend}: {source}")]
    SecretBackend {
        service: String,
        backend: String,
        #[source]
        source: SecretBackendError,
    },

    /// Service shape the plan builder cannot turn into steps
    #[error("unsupported service '{service}': {message}")]
    UnsupportedService { service: String, message: String },

    /// A plan artefact could not be rendered
    #[error("cannot render {artefact} for '{service}': {message}")]
    Render {
        service: String,
        artefact: String,
        message: String,
    },

    /// An execution step failed; later steps were not run
    #[error("step {index} ({step}) failed: {reason}")]
    StepFailure {
        index: usize,
        step: String,
        reason: String,
    },
}

impl ShipwrightError {
    /// The stage this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShipwrightError::ConfigRead { .. }
            | ShipwrightError::ConfigParse { .. }
            | ShipwrightError::InvalidRecord { .. }
            | ShipwrightError::Settings { .. } => ErrorKind::Config,
            ShipwrightError::NotFound { .. } => ErrorKind::NotFound,
            ShipwrightError::SecretBackend { .. } => ErrorKind::SecretBackend,
            ShipwrightError::UnsupportedService { .. } | ShipwrightError::Render { .. } => {
                ErrorKind::UnsupportedServiceType
            }
            ShipwrightError::StepFailure { .. } => ErrorKind::StepFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_matches_cli_contract() {
        let err = ShipwrightError::NotFound {
            name: "billing".to_string(),
            path: PathBuf::from("deployments.yml"),
        };
        assert_eq!(
            err.to_string(),
            "Service \"billing\" not found in deployments.yml"
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn invalid_record_names_position() {
        let err = ShipwrightError::InvalidRecord {
            path: PathBuf::from("deployments.yml"),
            position: 2,
            message: "missing required field 'name'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config deployments.yml: services[2]: missing required field 'name'"
        );
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn unsupported_service_is_a_plan_stage_error() {
        let err = ShipwrightError::UnsupportedService {
            service: "web".to_string(),
            message: "missing host".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::UnsupportedServiceType);
        assert_eq!(err.kind().stage(), "plan");
    }
}
