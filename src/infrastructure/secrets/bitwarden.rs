//! Bitwarden CLI secret backend
//!
//! Runs `bw get item <service>` and turns the item's custom fields into
//! secrets. The CLI must already be unlocked (`BW_SESSION` exported).

use std::collections::BTreeMap;
use std::process::Command;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::ports::{SecretBackend, SecretBackendError, SurfaceError};
use crate::infrastructure::process::run_with_timeout;

const DEFAULT_PROGRAM: &str = "bw";

#[derive(Debug, Deserialize)]
struct BwItem {
    #[serde(default)]
    fields: Vec<BwField>,
}

#[derive(Debug, Deserialize)]
struct BwField {
    name: Option<String>,
    value: Option<String>,
}

/// Secrets from a Bitwarden vault item named after the service
pub struct BitwardenSecretBackend {
    program: String,
    timeout: Duration,
}

impl BitwardenSecretBackend {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            timeout,
        }
    }

    /// Use a different CLI binary (wrappers, tests)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Parse `bw get item` output
    ///
    /// Errors report the JSON position only; serde messages can quote the
    /// offending value, which may be a secret.
    pub fn parse_item(json: &str) -> Result<BTreeMap<String, String>, SecretBackendError> {
        let item: BwItem = serde_json::from_str(json).map_err(|e| {
            SecretBackendError::Malformed(format!(
                "item is not valid JSON (line {}, column {})",
                e.line(),
                e.column()
            ))
        })?;

        let mut secrets = BTreeMap::new();
        for (i, field) in item.fields.into_iter().enumerate() {
            let name = field
                .name
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| SecretBackendError::Malformed(format!("field {} has no name", i)))?;
            secrets.insert(name, field.value.unwrap_or_default());
        }
        Ok(secrets)
    }

    fn classify_failure(service: &str, exit_code: i32, stderr: &str) -> SecretBackendError {
        let lowered = stderr.to_lowercase();
        let detail = stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("no error output")
            .to_string();

        if lowered.contains("not found") {
            SecretBackendError::Denied(format!("no vault item named '{}'", service))
        } else if lowered.contains("access denied") || lowered.contains("forbidden") {
            SecretBackendError::Denied(detail)
        } else {
            SecretBackendError::Unavailable(format!("bw exited with {}: {}", exit_code, detail))
        }
    }
}

impl SecretBackend for BitwardenSecretBackend {
    fn name(&self) -> &'static str {
        "bitwarden"
    }

    fn fetch(&self, service: &str) -> Result<BTreeMap<String, String>, SecretBackendError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["get", "item", service]);

        tracing::debug!(service, program = %self.program, "querying bitwarden");
        let output = run_with_timeout(cmd, None, self.timeout).map_err(|e| match e {
            SurfaceError::Spawn { program, .. } => {
                SecretBackendError::Unavailable(format!("'{}' is not installed or not on PATH", program))
            }
            other => SecretBackendError::Unavailable(other.to_string()),
        })?;

        if !output.is_success() {
            return Err(Self::classify_failure(service, output.exit_code, &output.stderr));
        }
        Self::parse_item(&output.stdout)
    }
}
