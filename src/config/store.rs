//! Deployments document loading and validation
//!
//! The document is YAML with a top-level `services` list. Every record is
//! validated at load time so later stages only ever see well-formed
//! [`ServiceDefinition`]s.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::entities::{
    check_not_option, check_service_name, env_identifier, ServiceDefinition,
};
use crate::domain::value_objects::ServiceType;
use crate::error::{ShipwrightError, ShipwrightResult};

/// Default location of the deployments document
pub const DEFAULT_CONFIG_PATH: &str = "deployments.yml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Dotted path of the ignored key, e.g. `services.0.replicas`
    pub key_path: String,
    pub file: PathBuf,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown key '{}' in {} (ignored)",
            self.key_path,
            self.file.display()
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    services: Option<Vec<RawServiceRecord>>,
}

#[derive(Debug, Deserialize)]
struct RawServiceRecord {
    name: Option<String>,
    #[serde(rename = "type")]
    service_type: Option<String>,
    host: Option<String>,
    port: Option<u64>,
    repository: Option<String>,
    compose_file: Option<String>,
    requires_secrets: Option<bool>,
    image: Option<String>,
    ssh_user: Option<String>,
}

/// Read-only view of a loaded deployments document
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    services: Vec<ServiceDefinition>,
    warnings: Vec<ConfigWarning>,
}

impl ConfigStore {
    /// Read and validate the document at `path`
    pub fn load(path: impl AsRef<Path>) -> ShipwrightResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ShipwrightError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(path, &content)
    }

    /// Validate document text; `path` is only used in messages
    pub fn from_yaml_str(path: impl AsRef<Path>, content: &str) -> ShipwrightResult<Self> {
        let path = path.as_ref().to_path_buf();

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = serde_yaml_ng::Deserializer::from_str(content);
        let raw: RawDocument = serde_ignored::deserialize(deserializer, |p| {
            unknown_paths.push(p.to_string());
        })
        .map_err(|e| ShipwrightError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let records = raw.services.ok_or_else(|| ShipwrightError::ConfigParse {
            path: path.clone(),
            message: "missing top-level 'services' list".to_string(),
        })?;

        let mut services: Vec<ServiceDefinition> = Vec::with_capacity(records.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut env_names: HashMap<String, usize> = HashMap::new();

        for (position, record) in records.into_iter().enumerate() {
            let invalid = |message: String| ShipwrightError::InvalidRecord {
                path: path.clone(),
                position,
                message,
            };

            let service = validate_record(record).map_err(invalid)?;
            if let Some(first) = seen.insert(service.name.clone(), position) {
                return Err(invalid(format!(
                    "duplicate name '{}' (first defined at services[{}])",
                    service.name, first
                )));
            }
            // Secrets are looked up by this form; two services must not share it
            if let Some(first) = env_names.insert(env_identifier(&service.name), position) {
                return Err(invalid(format!(
                    "name '{}' collides with '{}' (services[{}]) in secret variable names",
                    service.name, services[first].name, first
                )));
            }
            services.push(service);
        }

        let warnings = unknown_paths
            .into_iter()
            .map(|key_path| ConfigWarning {
                key_path,
                file: path.clone(),
            })
            .collect();

        Ok(Self {
            path,
            services,
            warnings,
        })
    }

    /// Path the document was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All services in document order
    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Case-sensitive exact lookup
    pub fn find(&self, name: &str) -> ShipwrightResult<&ServiceDefinition> {
        self.services
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ShipwrightError::NotFound {
                name: name.to_string(),
                path: self.path.clone(),
            })
    }
}

fn validate_record(record: RawServiceRecord) -> Result<ServiceDefinition, String> {
    let name = record
        .name
        .ok_or_else(|| "missing required field 'name'".to_string())?;
    check_service_name(&name)?;

    let service_type: ServiceType = record
        .service_type
        .ok_or_else(|| format!("service '{}': missing required field 'type'", name))?
        .parse()
        .map_err(|e| format!("service '{}': {}", name, e))?;

    let port = record
        .port
        .map(|port| match u16::try_from(port) {
            Ok(p) if p > 0 => Ok(p),
            _ => Err(format!(
                "service '{}': port {} out of range (1-65535)",
                name, port
            )),
        })
        .transpose()?;

    for (field, value) in [("host", &record.host), ("ssh_user", &record.ssh_user)] {
        if let Some(value) = value {
            check_not_option(field, value).map_err(|e| format!("service '{}': {}", name, e))?;
        }
    }

    match service_type {
        ServiceType::Service if record.host.is_none() => {
            return Err(format!("service '{}': type 'service' requires 'host'", name));
        }
        ServiceType::Platform if record.repository.is_none() => {
            return Err(format!(
                "service '{}': type 'platform' requires 'repository'",
                name
            ));
        }
        _ => {}
    }

    Ok(ServiceDefinition {
        name,
        service_type,
        host: record.host,
        port,
        repository: record.repository,
        compose_file: record.compose_file,
        requires_secrets: record.requires_secrets.unwrap_or(false),
        image: record.image,
        ssh_user: record.ssh_user,
    })
}
