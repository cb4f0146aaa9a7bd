//! Test environment for running the `shipwright` binary in isolation.

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Settings variables that must not leak in from the developer's shell
const SCRUBBED_VARS: &[&str] = &[
    "SHIPWRIGHT_SSH_USER",
    "SHIPWRIGHT_DEPLOY_ROOT",
    "SHIPWRIGHT_IMAGE_NAMESPACE",
    "SHIPWRIGHT_STEP_TIMEOUT",
    "SHIPWRIGHT_RETRIES",
    "SHIPWRIGHT_SECRETS_BACKEND",
    "SHIPWRIGHT_COMPOSE_COMMAND",
    "RUST_LOG",
];

/// Result of running a Shipwright CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// stdout then stderr, for assertion messages
    pub fn combined_output(&self) -> String {
        [self.stdout.as_str(), self.stderr.as_str()].join("\n")
    }
}

/// Isolated working directory and home directory
pub struct TestEnv {
    pub project_root: TempDir,
    pub home_dir: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            project_root: tempfile::tempdir().expect("create project dir"),
            home_dir: tempfile::tempdir().expect("create home dir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_shipwright")),
        }
    }

    /// Environment with `deployments.yml` already written
    pub fn with_deployments(content: &str) -> Self {
        let env = Self::new();
        env.write_project_file("deployments.yml", content);
        env
    }

    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    pub fn write_project_file(&self, relative: &str, content: &str) {
        let path = self.project_path(relative);
        let dir = path.parent().unwrap_or(self.project_root.path());
        std::fs::create_dir_all(dir).expect("create parent directories");
        std::fs::write(&path, content).expect("write project file");
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run from the project root with extra environment variables
    pub fn run_with_env(&self, args: &[&str], vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.project_root.path())
            .args(args)
            .env("HOME", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"))
            .env("NO_COLOR", "1");
        for name in SCRUBBED_VARS {
            cmd.env_remove(name);
        }
        cmd.envs(vars.iter().copied());

        TestResult::from(cmd.output().expect("spawn shipwright binary"))
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Output> for TestResult {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}
