//! Use Case Factory
//!
//! Creates the deploy use case with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::application::{CancellationToken, Executor, ExecutorOptions, Orchestrator, SecretProvider};
use crate::config::{SecretsBackendKind, Settings};
use crate::domain::ports::{DeployEventSink, SecretBackend};
use crate::domain::services::PlanBuilder;
use crate::infrastructure::{BitwardenSecretBackend, DefaultSurfaceFactory, EnvSecretBackend};

use super::cli::DeployArgs;

/// Apply deploy flags on top of loaded settings (flags win)
pub fn apply_cli_overrides(mut settings: Settings, args: &DeployArgs) -> Settings {
    if let Some(backend) = args.secrets {
        settings.secrets.backend = backend;
    }
    if let Some(timeout) = args.timeout {
        settings.execution.step_timeout_secs = timeout;
    }
    if let Some(retries) = args.retries {
        settings.execution.retries = retries;
    }
    if let Some(user) = &args.ssh_user {
        settings.remote.ssh_user = user.clone();
    }
    settings
}

/// Secret backend selected by settings
pub fn create_secret_backend(kind: SecretsBackendKind, timeout: Duration) -> Arc<dyn SecretBackend> {
    match kind {
        SecretsBackendKind::Env => Arc::new(EnvSecretBackend::new()),
        SecretsBackendKind::Bitwarden => Arc::new(BitwardenSecretBackend::new(timeout)),
    }
}

/// Executor policies from settings
pub fn executor_options(settings: &Settings, dry_run: bool) -> ExecutorOptions {
    ExecutorOptions::default()
        .with_dry_run(dry_run)
        .with_retries(settings.execution.retries)
        .with_retry_backoff(settings.retry_backoff())
}

/// Create the deploy use case with all dependencies wired up
///
/// `local_root` is where local (host-less) deployments are applied.
pub fn create_orchestrator(
    settings: &Settings,
    dry_run: bool,
    local_root: &Path,
    events: Arc<dyn DeployEventSink>,
    cancel: CancellationToken,
) -> Orchestrator {
    let timeout = settings.step_timeout();
    let secrets = SecretProvider::new(create_secret_backend(settings.secrets.backend, timeout));
    let executor = Executor::new(executor_options(settings, dry_run)).with_cancellation(cancel);

    Orchestrator::new(
        secrets,
        PlanBuilder::new(settings.planner_settings()),
        Box::new(DefaultSurfaceFactory::new(local_root, timeout)),
        executor,
    )
    .with_events(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> DeployArgs {
        DeployArgs {
            service: "billing".to_string(),
            config: PathBuf::from("deployments.yml"),
            dry_run: false,
            secrets: None,
            timeout: None,
            retries: None,
            ssh_user: None,
        }
    }

    #[test]
    fn flags_override_settings() {
        let args = DeployArgs {
            secrets: Some(SecretsBackendKind::Bitwarden),
            timeout: Some(30),
            retries: Some(3),
            ssh_user: Some("deploy".to_string()),
            ..args()
        };
        let settings = apply_cli_overrides(Settings::default(), &args);

        assert_eq!(settings.secrets.backend, SecretsBackendKind::Bitwarden);
        assert_eq!(settings.execution.step_timeout_secs, 30);
        assert_eq!(settings.execution.retries, 3);
        assert_eq!(settings.remote.ssh_user, "deploy");
    }

    #[test]
    fn absent_flags_keep_settings() {
        let settings = apply_cli_overrides(Settings::default(), &args());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn backend_kind_selects_implementation() {
        let timeout = Duration::from_secs(1);
        assert_eq!(create_secret_backend(SecretsBackendKind::Env, timeout).name(), "env");
        assert_eq!(
            create_secret_backend(SecretsBackendKind::Bitwarden, timeout).name(),
            "bitwarden"
        );
    }

    #[test]
    fn executor_options_follow_settings() {
        let mut settings = Settings::default();
        settings.execution.retries = 2;
        let options = executor_options(&settings, true);
        assert!(options.dry_run);
        assert_eq!(options.retries, 2);
        assert_eq!(options.retry_backoff, Duration::from_secs(1));
    }
}
