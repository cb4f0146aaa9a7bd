//! Tool settings
//!
//! Implements the settings hierarchy:
//! 1. CLI flags (highest priority, applied by the presentation layer)
//! 2. Environment variables (SHIPWRIGHT_*)
//! 3. Project settings (./.shipwright.toml)
//! 4. User settings (~/.config/shipwright/config.toml)
//! 5. Built-in defaults (lowest priority)

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::services::PlannerSettings;
use crate::error::{ShipwrightError, ShipwrightResult};

use super::store::ConfigWarning;

/// Project-level settings file name
pub const PROJECT_SETTINGS_FILE: &str = ".shipwright.toml";

/// Which secret backend to consult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SecretsBackendKind {
    /// `<SERVICE>__<KEY>` environment variables
    #[default]
    Env,
    /// Bitwarden CLI (`bw get item <service>`)
    Bitwarden,
}

impl fmt::Display for SecretsBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SecretsBackendKind::Env => "env",
            SecretsBackendKind::Bitwarden => "bitwarden",
        })
    }
}

impl FromStr for SecretsBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "env" => Ok(SecretsBackendKind::Env),
            "bitwarden" | "bw" => Ok(SecretsBackendKind::Bitwarden),
            other => Err(format!(
                "unknown secrets backend '{}' (expected env or bitwarden)",
                other
            )),
        }
    }
}

/// `[remote]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default = "default_ssh_user")]
    pub ssh_user: String,
    #[serde(default = "default_deploy_root")]
    pub deploy_root: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            ssh_user: default_ssh_user(),
            deploy_root: default_deploy_root(),
        }
    }
}

fn default_ssh_user() -> String {
    "admin".to_string()
}

fn default_deploy_root() -> String {
    "/opt/deployments".to_string()
}

/// `[images]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSettings {
    #[serde(default = "default_image_namespace")]
    pub namespace: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            namespace: default_image_namespace(),
        }
    }
}

fn default_image_namespace() -> String {
    "your-org".to_string()
}

/// `[compose]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeSettings {
    /// Whitespace-separated invocation, e.g. `docker compose`
    #[serde(default = "default_compose_command")]
    pub command: String,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            command: default_compose_command(),
        }
    }
}

fn default_compose_command() -> String {
    "docker-compose".to_string()
}

/// `[secrets]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SecretsSettings {
    #[serde(default)]
    pub backend: SecretsBackendKind,
}

/// `[execution]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Per-step time budget
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,
    /// Extra attempts for failed commands
    #[serde(default)]
    pub retries: u32,
    /// Delay before retry N is `N * retry_backoff_secs`
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            step_timeout_secs: default_step_timeout_secs(),
            retries: 0,
            retry_backoff_secs: default_retry_backoff_secs(),
        }
    }
}

fn default_step_timeout_secs() -> u64 {
    300
}

fn default_retry_backoff_secs() -> u64 {
    1
}

/// Complete tool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub images: ImageSettings,
    #[serde(default)]
    pub compose: ComposeSettings,
    #[serde(default)]
    pub secrets: SecretsSettings,
    #[serde(default)]
    pub execution: ExecutionSettings,
}

impl Settings {
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.execution.step_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.execution.retry_backoff_secs)
    }

    /// Compose invocation split into argv words
    pub fn compose_argv(&self) -> Vec<String> {
        let argv: Vec<String> = self
            .compose
            .command
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if argv.is_empty() {
            vec![default_compose_command()]
        } else {
            argv
        }
    }

    /// Subset the plan builder needs
    pub fn planner_settings(&self) -> PlannerSettings {
        PlannerSettings {
            deploy_root: self.remote.deploy_root.clone(),
            image_namespace: self.images.namespace.clone(),
            ssh_user: self.remote.ssh_user.clone(),
            compose_command: self.compose_argv(),
        }
    }
}

/// Load settings and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> ShipwrightResult<(Settings, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| ShipwrightError::Settings {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let settings: Settings = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ShipwrightError::Settings {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if settings.execution.step_timeout_secs == 0 {
        return Err(ShipwrightError::Settings {
            path: path.to_path_buf(),
            message: "execution.step_timeout_secs must be at least 1".to_string(),
        });
    }

    let warnings = unknown_paths
        .into_iter()
        .map(|key_path| ConfigWarning {
            key_path,
            file: path.to_path_buf(),
        })
        .collect();

    Ok((settings, warnings))
}

/// Candidate settings files, highest priority first
pub fn settings_paths(project_root: &Path) -> Vec<PathBuf> {
    let mut paths = vec![project_root.join(PROJECT_SETTINGS_FILE)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("shipwright/config.toml"));
    }
    paths
}

/// Load from project settings, user settings, or defaults; then apply env
///
/// An explicitly present but invalid settings file is an error: silently
/// falling back would deploy with unintended defaults.
pub fn load_or_default(project_root: &Path) -> ShipwrightResult<(Settings, Vec<ConfigWarning>)> {
    for path in settings_paths(project_root) {
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading settings");
            let (settings, warnings) = load_with_warnings(&path)?;
            return Ok((with_env_overrides(settings), warnings));
        }
    }
    Ok((with_env_overrides(Settings::default()), Vec::new()))
}

/// Apply environment variable overrides (SHIPWRIGHT_* prefix)
pub fn with_env_overrides(settings: Settings) -> Settings {
    with_overrides_from(settings, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary lookup (testable without touching env)
pub fn with_overrides_from<F>(mut settings: Settings, lookup: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(user) = lookup("SHIPWRIGHT_SSH_USER").filter(|v| !v.trim().is_empty()) {
        settings.remote.ssh_user = user;
    }

    if let Some(root) = lookup("SHIPWRIGHT_DEPLOY_ROOT").filter(|v| !v.trim().is_empty()) {
        settings.remote.deploy_root = root;
    }

    if let Some(ns) = lookup("SHIPWRIGHT_IMAGE_NAMESPACE").filter(|v| !v.trim().is_empty()) {
        settings.images.namespace = ns;
    }

    if let Some(cmd) = lookup("SHIPWRIGHT_COMPOSE_COMMAND").filter(|v| !v.trim().is_empty()) {
        settings.compose.command = cmd;
    }

    if let Some(backend) = lookup("SHIPWRIGHT_SECRETS_BACKEND") {
        match backend.parse() {
            Ok(kind) => settings.secrets.backend = kind,
            Err(e) => tracing::warn!("ignoring SHIPWRIGHT_SECRETS_BACKEND: {}", e),
        }
    }

    if let Some(timeout) = lookup("SHIPWRIGHT_STEP_TIMEOUT") {
        match timeout.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => settings.execution.step_timeout_secs = secs,
            _ => tracing::warn!("ignoring SHIPWRIGHT_STEP_TIMEOUT={:?}", timeout),
        }
    }

    if let Some(retries) = lookup("SHIPWRIGHT_RETRIES") {
        match retries.trim().parse::<u32>() {
            Ok(n) => settings.execution.retries = n,
            Err(_) => tracing::warn!("ignoring SHIPWRIGHT_RETRIES={:?}", retries),
        }
    }

    settings
}
