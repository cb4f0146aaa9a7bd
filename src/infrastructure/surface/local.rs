//! Local Remote Surface
//!
//! Applies plan steps on the orchestrating machine. Relative paths and
//! working directories resolve against a fixed root (the directory the
//! deployment was started from).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::domain::ports::{CommandOutput, RemoteSurface, SurfaceError, SurfaceResult};
use crate::infrastructure::process::run_with_timeout;

/// Local surface rooted at a directory
#[derive(Debug, Clone)]
pub struct LocalSurface {
    root: PathBuf,
    timeout: Duration,
}

impl LocalSurface {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl RemoteSurface for LocalSurface {
    fn describe(&self) -> String {
        format!("local ({})", self.root.display())
    }

    fn exists(&self, path: &Path) -> SurfaceResult<bool> {
        Ok(self.resolve(path).exists())
    }

    fn ensure_directory(&self, path: &Path) -> SurfaceResult<()> {
        std::fs::create_dir_all(self.resolve(path))?;
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> SurfaceResult<()> {
        let target = self.resolve(path);
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        std::fs::create_dir_all(&parent)?;

        // Use atomic write (tempfile + rename) so readers never see a partial file
        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| SurfaceError::Io(e.error))?;
        Ok(())
    }

    fn run_command(&self, argv: &[String], workdir: Option<&Path>) -> SurfaceResult<CommandOutput> {
        let (program, args) = argv.split_first().ok_or(SurfaceError::EmptyCommand)?;
        let cwd = workdir
            .map(|dir| self.resolve(dir))
            .unwrap_or_else(|| self.root.clone());

        tracing::debug!(cwd = %cwd.display(), command = %argv.join(" "), "local exec");
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(cwd);
        run_with_timeout(cmd, None, self.timeout)
    }
}
