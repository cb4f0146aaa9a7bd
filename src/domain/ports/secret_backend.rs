//! SecretBackend port - pluggable source of per-service credentials
//!
//! The concrete backend (environment, password-manager CLI, vault) is
//! injected; nothing in the domain or application layers names one.

use std::collections::BTreeMap;

use thiserror::Error;

/// Secret backend failures
///
/// Messages carry backend diagnostics only, never secret values.
#[derive(Debug, Error)]
pub enum SecretBackendError {
    /// Backend could not be reached (binary missing, network down, locked vault)
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// Backend refused access or has no item for the service
    #[error("access denied: {0}")]
    Denied(String),
    /// Backend answered with something unusable
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Source of named secrets
pub trait SecretBackend: Send + Sync {
    /// Short backend name for diagnostics (`env`, `bitwarden`, ...)
    fn name(&self) -> &'static str;

    /// Fetch every secret stored for `service`
    fn fetch(&self, service: &str) -> Result<BTreeMap<String, String>, SecretBackendError>;
}
