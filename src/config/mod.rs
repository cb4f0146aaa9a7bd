//! Configuration module for Shipwright
//!
//! Two documents are involved:
//! - the deployments document (`deployments.yml`), loaded by [`ConfigStore`]
//! - tool settings (`.shipwright.toml`), loaded by [`settings`]

pub mod settings;
mod store;

pub use settings::{
    load_or_default, with_env_overrides, ComposeSettings, ExecutionSettings, ImageSettings,
    RemoteSettings, SecretsBackendKind, SecretsSettings, Settings,
};
pub use store::{ConfigStore, ConfigWarning, DEFAULT_CONFIG_PATH};
