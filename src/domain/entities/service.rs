//! Service Definition Entity
//!
//! One deployable unit declared in the deployments document.

use serde::Serialize;

use crate::domain::value_objects::ServiceType;

/// Compose file used when a platform record does not name one
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Check that `name` is usable as a directory name and a command argument
pub fn check_service_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("'name' must not be empty".to_string());
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(format!("name '{}' must not contain '/', '\\' or '..'", name));
    }
    check_not_option("name", name)
}

/// Reject values a command would parse as an option
pub fn check_not_option(field: &str, value: &str) -> Result<(), String> {
    if value.starts_with('-') {
        return Err(format!("{} '{}' must not start with '-'", field, value));
    }
    Ok(())
}

/// `name` in upper snake case, as used in environment variable names
///
/// Not injective: `billing-api` and `billing_api` both give `BILLING_API`.
pub fn env_identifier(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// A validated service record
///
/// Produced by the config store and never mutated afterwards. `name` is the
/// unique key within one deployments document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose_file: Option<String>,
    pub requires_secrets: bool,
    /// Container image; defaults to `<namespace>/<name>:latest`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Per-service SSH login, overriding the global setting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_user: Option<String>,
}

impl ServiceDefinition {
    /// Minimal definition; remaining fields default to absent
    pub fn new(name: impl Into<String>, service_type: ServiceType) -> Self {
        Self {
            name: name.into(),
            service_type,
            host: None,
            port: None,
            repository: None,
            compose_file: None,
            requires_secrets: false,
            image: None,
            ssh_user: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn with_compose_file(mut self, compose_file: impl Into<String>) -> Self {
        self.compose_file = Some(compose_file.into());
        self
    }

    pub fn with_requires_secrets(mut self, requires: bool) -> Self {
        self.requires_secrets = requires;
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_ssh_user(mut self, user: impl Into<String>) -> Self {
        self.ssh_user = Some(user.into());
        self
    }

    pub fn compose_file_or_default(&self) -> &str {
        self.compose_file.as_deref().unwrap_or(DEFAULT_COMPOSE_FILE)
    }

    /// Image reference, falling back to `<namespace>/<name>:latest`
    pub fn image_reference(&self, namespace: &str) -> String {
        match &self.image {
            Some(image) => image.clone(),
            None => format!("{}/{}:latest", namespace, self.name),
        }
    }
}
