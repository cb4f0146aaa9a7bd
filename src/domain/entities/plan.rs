//! Deployment Plan Entity
//!
//! Immutable, ordered list of concrete actions derived from a service
//! definition and its secrets. Built fresh for every invocation.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::ContentHash;

/// Where a plan is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployTarget {
    /// Host reached over SSH as `user@host`
    Remote { user: String, host: String },
    /// The orchestrating machine itself
    Local,
}

impl DeployTarget {
    /// SSH destination, or `local`
    pub fn destination(&self) -> String {
        match self {
            DeployTarget::Remote { user, host } => format!("{}@{}", user, host),
            DeployTarget::Local => "local".to_string(),
        }
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.destination())
    }
}

/// One concrete action
#[derive(Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Create a directory and its parents if absent
    EnsureDirectory { path: PathBuf },
    /// Create or overwrite a file
    WriteFile { path: PathBuf, content: String },
    /// Run a program, optionally from a working directory
    RunCommand {
        argv: Vec<String>,
        workdir: Option<PathBuf>,
    },
    /// Clone `repository` into `checkout`, or fast-forward an existing checkout
    SyncRepository {
        repository: String,
        checkout: PathBuf,
    },
}

/// Git invocation for a [`PlanStep::SyncRepository`] step
///
/// `present` says whether `checkout` already holds a clone.
pub fn repository_sync_argv(repository: &str, checkout: &Path, present: bool) -> Vec<String> {
    let checkout = checkout.to_string_lossy().into_owned();
    if present {
        vec![
            "git".to_string(),
            "-C".to_string(),
            checkout,
            "pull".to_string(),
            "--ff-only".to_string(),
        ]
    } else {
        vec![
            "git".to_string(),
            "clone".to_string(),
            "--".to_string(),
            repository.to_string(),
            checkout,
        ]
    }
}

impl PlanStep {
    pub fn ensure_directory(path: impl Into<PathBuf>) -> Self {
        PlanStep::EnsureDirectory { path: path.into() }
    }

    pub fn write_file(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        PlanStep::WriteFile {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn run<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlanStep::RunCommand {
            argv: argv.into_iter().map(Into::into).collect(),
            workdir: None,
        }
    }

    pub fn run_in<I, S>(workdir: impl Into<PathBuf>, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlanStep::RunCommand {
            argv: argv.into_iter().map(Into::into).collect(),
            workdir: Some(workdir.into()),
        }
    }

    pub fn sync_repository(repository: impl Into<String>, checkout: impl Into<PathBuf>) -> Self {
        PlanStep::SyncRepository {
            repository: repository.into(),
            checkout: checkout.into(),
        }
    }

    /// Stable kind label
    pub fn kind(&self) -> &'static str {
        match self {
            PlanStep::EnsureDirectory { .. } => "ensure-directory",
            PlanStep::WriteFile { .. } => "write-file",
            PlanStep::RunCommand { .. } => "run-command",
            PlanStep::SyncRepository { .. } => "sync-repository",
        }
    }

    /// Whether the step spawns a program (and so may be retried)
    pub fn runs_command(&self) -> bool {
        matches!(
            self,
            PlanStep::RunCommand { .. } | PlanStep::SyncRepository { .. }
        )
    }

    /// Whether repeating this step is harmless by construction
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, PlanStep::RunCommand { .. })
    }

    /// Human-readable, secret-free description
    ///
    /// File contents are masked because rendered files carry secret values.
    pub fn describe(&self) -> String {
        match self {
            PlanStep::EnsureDirectory { path } => format!("mkdir -p {}", path.display()),
            PlanStep::WriteFile { path, content } => {
                format!("write {} ({} bytes)", path.display(), content.len())
            }
            PlanStep::RunCommand { argv, workdir } => match workdir {
                Some(dir) => format!("(cd {}) {}", dir.display(), argv.join(" ")),
                None => argv.join(" "),
            },
            PlanStep::SyncRepository {
                repository,
                checkout,
            } => format!(
                "{} (pull if present)",
                repository_sync_argv(repository, checkout, false).join(" ")
            ),
        }
    }

    /// Path touched by a filesystem step
    pub fn path(&self) -> Option<&Path> {
        match self {
            PlanStep::EnsureDirectory { path } | PlanStep::WriteFile { path, .. } => Some(path),
            PlanStep::SyncRepository { checkout, .. } => Some(checkout),
            PlanStep::RunCommand { .. } => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PlanStep::EnsureDirectory { path } => serde_json::json!({
                "kind": self.kind(),
                "path": path.display().to_string(),
            }),
            PlanStep::WriteFile { path, content } => serde_json::json!({
                "kind": self.kind(),
                "path": path.display().to_string(),
                "bytes": content.len(),
            }),
            PlanStep::RunCommand { argv, workdir } => serde_json::json!({
                "kind": self.kind(),
                "argv": argv,
                "workdir": workdir.as_ref().map(|d| d.display().to_string()),
            }),
            PlanStep::SyncRepository {
                repository,
                checkout,
            } => serde_json::json!({
                "kind": self.kind(),
                "repository": repository,
                "path": checkout.display().to_string(),
            }),
        }
    }

    fn hash_chunks(&self) -> Vec<Vec<u8>> {
        let mut chunks = vec![self.kind().as_bytes().to_vec()];
        match self {
            PlanStep::EnsureDirectory { path } => {
                chunks.push(path.to_string_lossy().into_owned().into_bytes());
            }
            PlanStep::WriteFile { path, content } => {
                chunks.push(path.to_string_lossy().into_owned().into_bytes());
                chunks.push(content.as_bytes().to_vec());
            }
            PlanStep::RunCommand { argv, workdir } => {
                let dir = workdir
                    .as_ref()
                    .map(|d| d.to_string_lossy().into_owned())
                    .unwrap_or_default();
                chunks.push(dir.into_bytes());
                chunks.extend(argv.iter().map(|a| a.as_bytes().to_vec()));
            }
            PlanStep::SyncRepository {
                repository,
                checkout,
            } => {
                chunks.push(repository.as_bytes().to_vec());
                chunks.push(checkout.to_string_lossy().into_owned().into_bytes());
            }
        }
        chunks
    }
}

impl fmt::Debug for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.describe())
    }
}

/// Ordered deployment plan for one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    service: String,
    target: DeployTarget,
    environment_keys: Vec<String>,
    steps: Vec<PlanStep>,
}

impl DeploymentPlan {
    pub fn new(
        service: impl Into<String>,
        target: DeployTarget,
        environment_keys: Vec<String>,
        steps: Vec<PlanStep>,
    ) -> Self {
        Self {
            service: service.into(),
            target,
            environment_keys,
            steps,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn target(&self) -> &DeployTarget {
        &self.target
    }

    /// Names of the secrets injected into the environment
    pub fn environment_keys(&self) -> &[String] {
        &self.environment_keys
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Content of the first file written to `path`, if any
    pub fn file_content(&self, path: &Path) -> Option<&str> {
        self.steps.iter().find_map(|step| match step {
            PlanStep::WriteFile { path: p, content } if p == path => Some(content.as_str()),
            _ => None,
        })
    }

    /// Hash over target and every step, in order
    pub fn fingerprint(&self) -> ContentHash {
        let mut chunks: Vec<Vec<u8>> = vec![
            self.service.as_bytes().to_vec(),
            self.target.destination().into_bytes(),
        ];
        for step in &self.steps {
            chunks.extend(step.hash_chunks());
        }
        ContentHash::from_chunks(chunks.iter().map(Vec::as_slice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> DeploymentPlan {
        DeploymentPlan::new(
            "api",
            DeployTarget::Remote {
                user: "admin".to_string(),
                host: "10.0.0.5".to_string(),
            },
            vec!["API_KEY".to_string()],
            vec![
                PlanStep::ensure_directory("/opt/deployments/api"),
                PlanStep::write_file("/opt/deployments/api/docker-compose.yml", "API_KEY: s3cret"),
                PlanStep::run_in("/opt/deployments/api", ["docker-compose", "pull"]),
            ],
        )
    }

    #[test]
    fn describe_masks_file_content() {
        let plan = sample_plan();
        let described = plan.steps()[1].describe();
        assert!(!described.contains("s3cret"));
        assert!(described.contains("15 bytes"));
        assert!(!format!("{:?}", plan).contains("s3cret"));
    }

    #[test]
    fn run_command_describe_includes_workdir() {
        let plan = sample_plan();
        assert_eq!(
            plan.steps()[2].describe(),
            "(cd /opt/deployments/api) docker-compose pull"
        );
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let plan = sample_plan();
        let mut steps = plan.steps().to_vec();
        steps[1] = PlanStep::write_file("/opt/deployments/api/docker-compose.yml", "other");
        let changed = DeploymentPlan::new("api", plan.target().clone(), vec![], steps);
        assert_ne!(plan.fingerprint(), changed.fingerprint());
        assert_eq!(plan.fingerprint(), sample_plan().fingerprint());
    }

    #[test]
    fn destination_formats() {
        assert_eq!(sample_plan().target().destination(), "admin@10.0.0.5");
        assert_eq!(DeployTarget::Local.destination(), "local");
    }

    #[test]
    fn sync_repository_argv_depends_on_checkout() {
        let checkout = Path::new("stack");
        assert_eq!(
            repository_sync_argv("--upload-pack=touch x", checkout, false),
            ["git", "clone", "--", "--upload-pack=touch x", "stack"]
        );
        assert_eq!(
            repository_sync_argv("https://github.com/acme/stack.git", checkout, true),
            ["git", "-C", "stack", "pull", "--ff-only"]
        );
    }

    #[test]
    fn sync_repository_describes_clone() {
        let step = PlanStep::sync_repository("https://github.com/acme/stack.git", "stack");
        assert_eq!(
            step.describe(),
            "git clone -- https://github.com/acme/stack.git stack (pull if present)"
        );
        assert!(step.is_idempotent());
        assert!(step.runs_command());
    }

    #[test]
    fn only_commands_are_not_idempotent() {
        let plan = sample_plan();
        assert!(plan.steps()[0].is_idempotent());
        assert!(plan.steps()[1].is_idempotent());
        assert!(!plan.steps()[2].is_idempotent());
    }
}
