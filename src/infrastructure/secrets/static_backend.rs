//! Fixed in-memory secret backend

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::ports::{SecretBackend, SecretBackendError};

/// Backend answering from a fixed table; counts every fetch
///
/// Services absent from the table are denied. Values can be replaced
/// between calls to simulate rotation.
#[derive(Default)]
pub struct StaticSecretBackend {
    secrets: Mutex<BTreeMap<String, BTreeMap<String, String>>>,
    unavailable: Option<String>,
    calls: AtomicUsize,
}

impl StaticSecretBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that fails every fetch as unreachable
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            unavailable: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_secret(
        self,
        service: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set(service, key, value);
        self
    }

    /// Insert or replace one secret
    pub fn set(&self, service: impl Into<String>, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut secrets) = self.secrets.lock() {
            secrets
                .entry(service.into())
                .or_default()
                .insert(key.into(), value.into());
        }
    }

    /// Number of `fetch` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SecretBackend for StaticSecretBackend {
    fn name(&self) -> &'static str {
        "static"
    }

    fn fetch(&self, service: &str) -> Result<BTreeMap<String, String>, SecretBackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.unavailable {
            return Err(SecretBackendError::Unavailable(message.clone()));
        }
        let secrets = self
            .secrets
            .lock()
            .map_err(|_| SecretBackendError::Unavailable("secret table poisoned".to_string()))?;
        secrets
            .get(service)
            .cloned()
            .ok_or_else(|| SecretBackendError::Denied(format!("no secrets stored for '{}'", service)))
    }
}
