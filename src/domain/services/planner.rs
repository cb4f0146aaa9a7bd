//! Deployment planning service
//!
//! Pure domain logic: turns a service definition and its secrets into an
//! ordered [`DeploymentPlan`] without performing any I/O. Identical inputs
//! always produce identical plans (byte-equal file contents included).

use std::path::PathBuf;

use crate::domain::entities::{
    check_not_option, check_service_name, DeployTarget, DeploymentPlan, PlanStep, SecretBundle,
    ServiceDefinition,
};
use crate::domain::value_objects::ServiceType;
use crate::error::{ShipwrightError, ShipwrightResult};

use super::render::{render_compose, render_env_file};

/// File name of the compose descriptor written for `service` deployments
pub const COMPOSE_DESCRIPTOR: &str = "docker-compose.yml";

/// File name of the dotenv file written for `platform` deployments
pub const ENV_FILE: &str = ".env";

/// Knobs the planner needs from tool settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerSettings {
    /// Parent of per-service directories on remote hosts
    pub deploy_root: String,
    /// Namespace for default image references
    pub image_namespace: String,
    /// SSH login used when a service does not name one
    pub ssh_user: String,
    /// Compose invocation, e.g. `["docker-compose"]` or `["docker", "compose"]`
    pub compose_command: Vec<String>,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            deploy_root: "/opt/deployments".to_string(),
            image_namespace: "your-org".to_string(),
            ssh_user: "admin".to_string(),
            compose_command: vec!["docker-compose".to_string()],
        }
    }
}

/// Builds deployment plans
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    settings: PlannerSettings,
}

impl PlanBuilder {
    pub fn new(settings: PlannerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Build the plan for `service`
    ///
    /// Services whose shape does not match their type (no host for a
    /// `service`, no repository for a `platform`) are rejected rather than
    /// defaulted.
    pub fn build(
        &self,
        service: &ServiceDefinition,
        secrets: &SecretBundle,
    ) -> ShipwrightResult<DeploymentPlan> {
        self.check_arguments(service)?;
        match service.service_type {
            ServiceType::Service => self.build_service(service, secrets),
            ServiceType::Platform => self.build_platform(service, secrets),
        }
    }

    /// Target a service is applied to: its host over SSH, else this machine
    pub fn target_for(&self, service: &ServiceDefinition) -> DeployTarget {
        match &service.host {
            Some(host) => DeployTarget::Remote {
                user: service
                    .ssh_user
                    .clone()
                    .unwrap_or_else(|| self.settings.ssh_user.clone()),
                host: host.clone(),
            },
            None => DeployTarget::Local,
        }
    }

    /// Names and logins end up as git and ssh arguments
    fn check_arguments(&self, service: &ServiceDefinition) -> ShipwrightResult<()> {
        check_service_name(&service.name).map_err(|m| unsupported(service, &m))?;
        if let DeployTarget::Remote { user, host } = self.target_for(service) {
            check_not_option("ssh_user", &user).map_err(|m| unsupported(service, &m))?;
            check_not_option("host", &host).map_err(|m| unsupported(service, &m))?;
        }
        Ok(())
    }

    /// ensure-directory, write compose descriptor, pull, up
    fn build_service(
        &self,
        service: &ServiceDefinition,
        secrets: &SecretBundle,
    ) -> ShipwrightResult<DeploymentPlan> {
        if service.host.is_none() {
            return Err(unsupported(service, "type 'service' requires a host"));
        }

        let deploy_dir = self.deploy_dir(&service.name);
        let compose_path = deploy_dir.join(COMPOSE_DESCRIPTOR);
        let compose = render_compose(service, secrets, &self.settings.image_namespace)
            .map_err(|e| ShipwrightError::Render {
                service: service.name.clone(),
                artefact: COMPOSE_DESCRIPTOR.to_string(),
                message: e.to_string(),
            })?;

        let steps = vec![
            PlanStep::ensure_directory(deploy_dir.clone()),
            PlanStep::write_file(compose_path, compose),
            PlanStep::run_in(deploy_dir.clone(), self.compose(["pull"])),
            PlanStep::run_in(deploy_dir, self.compose(["up", "-d"])),
        ];

        Ok(DeploymentPlan::new(
            service.name.clone(),
            self.target_for(service),
            secrets.keys(),
            steps,
        ))
    }

    /// sync repository, write dotenv, compose build + up
    fn build_platform(
        &self,
        service: &ServiceDefinition,
        secrets: &SecretBundle,
    ) -> ShipwrightResult<DeploymentPlan> {
        let Some(repository) = service.repository.as_deref() else {
            return Err(unsupported(service, "type 'platform' requires a repository"));
        };

        let checkout = PathBuf::from(&service.name);
        let compose_file = service.compose_file_or_default();

        let steps = vec![
            PlanStep::sync_repository(repository, checkout.clone()),
            PlanStep::write_file(checkout.join(ENV_FILE), render_env_file(secrets)),
            PlanStep::run_in(
                checkout,
                self.compose(["-f", compose_file, "up", "-d", "--build"]),
            ),
        ];

        Ok(DeploymentPlan::new(
            service.name.clone(),
            self.target_for(service),
            secrets.keys(),
            steps,
        ))
    }

    fn deploy_dir(&self, service: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}/{}",
            self.settings.deploy_root.trim_end_matches('/'),
            service
        ))
    }

    fn compose<'a, I>(&self, args: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.settings
            .compose_command
            .iter()
            .cloned()
            .chain(args.into_iter().map(str::to_string))
            .collect()
    }
}

fn unsupported(service: &ServiceDefinition, message: &str) -> ShipwrightError {
    ShipwrightError::UnsupportedService {
        service: service.name.clone(),
        message: message.to_string(),
    }
}
