//! Environment variable secret backend
//!
//! Every variable named `<SERVICE>__<KEY>` becomes secret `KEY` for
//! `service`, where `<SERVICE>` is the service name in upper snake case
//! (`billing-api` reads `BILLING_API__*`).
//!
//! A stripped key that starts with `_` or contains `__` belongs to a longer
//! service name (`API__GATEWAY__TOKEN` is for `api--gateway`, not `api`) and
//! is skipped.

use std::collections::BTreeMap;

use crate::domain::entities::env_identifier;
use crate::domain::ports::{SecretBackend, SecretBackendError};

const SEPARATOR: &str = "__";

/// Where variables come from
enum VarSource {
    Process,
    Fixed(Vec<(String, String)>),
}

/// Reads secrets from environment variables
pub struct EnvSecretBackend {
    source: VarSource,
}

impl EnvSecretBackend {
    /// Backend over the current process environment
    pub fn new() -> Self {
        Self {
            source: VarSource::Process,
        }
    }

    /// Backend over a fixed set of variables (for tests)
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            source: VarSource::Fixed(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Variable prefix for `service`, e.g. `BILLING_API__`
    pub fn prefix_for(service: &str) -> String {
        env_identifier(service) + SEPARATOR
    }

    fn vars(&self) -> Vec<(String, String)> {
        match &self.source {
            // Non-UTF-8 variables cannot name secrets; skip them
            VarSource::Process => std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
            VarSource::Fixed(vars) => vars.clone(),
        }
    }
}

impl Default for EnvSecretBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretBackend for EnvSecretBackend {
    fn name(&self) -> &'static str {
        "env"
    }

    fn fetch(&self, service: &str) -> Result<BTreeMap<String, String>, SecretBackendError> {
        let prefix = Self::prefix_for(service);
        Ok(self
            .vars()
            .into_iter()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix(&prefix)?;
                let owned = !name.is_empty() && !name.starts_with('_') && !name.contains(SEPARATOR);
                owned.then(|| (name.to_string(), value))
            })
            .collect())
    }
}
