//! Secret Provider
//!
//! Resolves the secret bundle for one service through an injected
//! [`SecretBackend`]. Every call goes to the backend; bundles are never
//! cached, so rotated secrets are picked up by the next deployment.

use std::sync::Arc;

use crate::domain::entities::SecretBundle;
use crate::domain::ports::{SecretBackend, SecretBackendError};
use crate::error::{ShipwrightError, ShipwrightResult};

/// Resolves secrets for services
#[derive(Clone)]
pub struct SecretProvider {
    backend: Arc<dyn SecretBackend>,
}

impl SecretProvider {
    pub fn new(backend: Arc<dyn SecretBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Fetch and validate the secrets for `service`
    ///
    /// A bundle with an empty value is rejected as a whole: deploying with
    /// a partially provisioned secret set is worse than not deploying.
    pub fn resolve(&self, service: &str) -> ShipwrightResult<SecretBundle> {
        let wrap = |source: SecretBackendError| ShipwrightError::SecretBackend {
            service: service.to_string(),
            backend: self.backend.name().to_string(),
            source,
        };

        let values = self.backend.fetch(service).map_err(wrap)?;

        for (key, value) in &values {
            validate_key(key).map_err(wrap)?;
            if value.is_empty() {
                return Err(wrap(SecretBackendError::Malformed(format!(
                    "secret '{}' has an empty value",
                    key
                ))));
            }
        }

        let bundle = SecretBundle::from_map(values);
        tracing::info!(
            service,
            backend = self.backend.name(),
            keys = ?bundle.keys(),
            "resolved secrets"
        );
        Ok(bundle)
    }
}

/// Secret names end up as env file keys and YAML mapping keys
fn validate_key(key: &str) -> Result<(), SecretBackendError> {
    if key.is_empty() {
        return Err(SecretBackendError::Malformed(
            "secret with an empty name".to_string(),
        ));
    }
    if key.chars().any(|c| c.is_whitespace() || c.is_control() || c == '=') {
        return Err(SecretBackendError::Malformed(format!(
            "secret name '{}' contains whitespace or '='",
            key.escape_default()
        )));
    }
    Ok(())
}
