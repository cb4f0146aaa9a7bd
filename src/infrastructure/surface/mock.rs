//! In-memory surface
//!
//! Records every call and keeps written files in memory. Failures can be
//! scripted per call number. Clones share state, so a test can hand one
//! clone to the code under test and inspect the other.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::entities::DeployTarget;
use crate::domain::ports::{
    CommandOutput, RemoteSurface, SurfaceError, SurfaceFactory, SurfaceResult,
};

/// One recorded surface call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    EnsureDirectory(PathBuf),
    WriteFile(PathBuf),
    RunCommand(Vec<String>),
}

/// Scripted behaviour for a call
#[derive(Debug, Clone)]
enum Script {
    Exit(i32, String),
    Error(String),
    Timeout,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<SurfaceCall>,
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    scripts: HashMap<usize, Script>,
}

/// Recording surface for tests
#[derive(Debug, Clone, Default)]
pub struct MockSurface {
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockSurface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::default(),
        }
    }

    /// Make call number `call` (1-based) return a non-zero exit
    pub fn fail_call(self, call: usize, exit_code: i32, stderr: impl Into<String>) -> Self {
        self.script(call, Script::Exit(exit_code, stderr.into()))
    }

    /// Make call number `call` (1-based) return a surface error
    pub fn error_call(self, call: usize, message: impl Into<String>) -> Self {
        self.script(call, Script::Error(message.into()))
    }

    /// Make call number `call` (1-based) time out
    pub fn timeout_call(self, call: usize) -> Self {
        self.script(call, Script::Timeout)
    }

    fn script(self, call: usize, script: Script) -> Self {
        self.lock().scripts.insert(call, script);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panic while holding the lock only happens inside a failing test
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.lock().calls.clone()
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock().files.get(path.as_ref()).cloned()
    }

    pub fn has_directory(&self, path: impl AsRef<Path>) -> bool {
        self.lock().dirs.contains(path.as_ref())
    }

    /// Pretend `path` already exists on the surface
    pub fn with_directory(self, path: impl Into<PathBuf>) -> Self {
        self.lock().dirs.insert(path.into());
        self
    }

    /// Record `call` and return its scripted outcome, if any
    fn record(&self, call: SurfaceCall) -> Option<Script> {
        let mut state = self.lock();
        state.calls.push(call);
        let number = state.calls.len();
        state.scripts.get(&number).cloned()
    }
}

fn scripted_error(script: Script) -> SurfaceError {
    match script {
        Script::Timeout => SurfaceError::TimedOut(Duration::from_secs(0)),
        Script::Error(message) => SurfaceError::Remote(message),
        Script::Exit(code, stderr) => SurfaceError::Remote(format!("exit {}: {}", code, stderr)),
    }
}

impl RemoteSurface for MockSurface {
    fn describe(&self) -> String {
        self.name.clone()
    }

    /// Read-only queries are not recorded as calls
    fn exists(&self, path: &Path) -> SurfaceResult<bool> {
        let state = self.lock();
        Ok(state.dirs.contains(path) || state.files.contains_key(path))
    }

    fn ensure_directory(&self, path: &Path) -> SurfaceResult<()> {
        if let Some(script) = self.record(SurfaceCall::EnsureDirectory(path.to_path_buf())) {
            return Err(scripted_error(script));
        }
        self.lock().dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> SurfaceResult<()> {
        if let Some(script) = self.record(SurfaceCall::WriteFile(path.to_path_buf())) {
            return Err(scripted_error(script));
        }
        self.lock()
            .files
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn run_command(&self, argv: &[String], _workdir: Option<&Path>) -> SurfaceResult<CommandOutput> {
        if argv.is_empty() {
            return Err(SurfaceError::EmptyCommand);
        }
        match self.record(SurfaceCall::RunCommand(argv.to_vec())) {
            None => Ok(CommandOutput::success()),
            Some(Script::Exit(code, stderr)) => Ok(CommandOutput::failure(code, stderr)),
            Some(other) => Err(scripted_error(other)),
        }
    }
}

/// Factory handing out clones of one [`MockSurface`] and remembering targets
#[derive(Debug, Clone, Default)]
pub struct MockSurfaceFactory {
    surface: MockSurface,
    targets: Arc<Mutex<Vec<DeployTarget>>>,
}

impl MockSurfaceFactory {
    pub fn new(surface: MockSurface) -> Self {
        Self {
            surface,
            targets: Arc::default(),
        }
    }

    /// Targets requested so far
    pub fn targets(&self) -> Vec<DeployTarget> {
        self.targets
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }
}

impl SurfaceFactory for MockSurfaceFactory {
    fn surface_for(&self, target: &DeployTarget) -> Box<dyn RemoteSurface> {
        if let Ok(mut targets) = self.targets.lock() {
            targets.push(target.clone());
        }
        Box::new(self.surface.clone())
    }
}
