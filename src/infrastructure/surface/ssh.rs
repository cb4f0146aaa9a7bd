//! SSH Remote Surface
//!
//! Applies plan steps on a remote host by shelling out to the system `ssh`
//! client. Every operation is a single non-interactive SSH invocation with
//! a hard timeout.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::domain::ports::{CommandOutput, RemoteSurface, SurfaceError, SurfaceResult};
use crate::infrastructure::process::run_with_timeout;

/// Remote surface reached over SSH
pub struct SshSurface {
    /// SSH destination (user@host)
    destination: String,
    timeout: Duration,
}

impl SshSurface {
    pub fn new(destination: impl Into<String>, timeout: Duration) -> Self {
        Self {
            destination: destination.into(),
            timeout,
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Quote a word for safe use in a remote POSIX shell
    pub fn quote(word: &str) -> String {
        if !word.is_empty()
            && word
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '@' | '=' | ','))
        {
            return word.to_string();
        }
        format!("'{}'", word.replace('\'', "'\\''"))
    }

    fn quote_path(path: &Path) -> String {
        Self::quote(&path.to_string_lossy())
    }

    /// Remote shell line for `argv`, optionally run from `workdir`
    pub fn command_line(argv: &[String], workdir: Option<&Path>) -> String {
        let words: Vec<String> = argv.iter().map(|a| Self::quote(a)).collect();
        match workdir {
            Some(dir) => format!("cd {} && {}", Self::quote_path(dir), words.join(" ")),
            None => words.join(" "),
        }
    }

    fn ssh(&self, remote_command: &str) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!("ConnectTimeout={}", self.timeout.as_secs().max(1)))
            .arg("--")
            .arg(&self.destination)
            .arg(remote_command);
        cmd
    }

    /// Run a filesystem helper command; non-zero exit becomes an error
    fn run_checked(&self, remote_command: &str, input: Option<&str>) -> SurfaceResult<()> {
        let output = run_with_timeout(self.ssh(remote_command), input, self.timeout)?;
        if output.is_success() {
            Ok(())
        } else {
            Err(SurfaceError::Remote(format!(
                "ssh {} exited with {}: {}",
                self.destination,
                output.exit_code,
                output.stderr_tail().unwrap_or("no error output")
            )))
        }
    }
}

impl RemoteSurface for SshSurface {
    fn describe(&self) -> String {
        self.destination.clone()
    }

    fn exists(&self, path: &Path) -> SurfaceResult<bool> {
        let line = format!("test -e {}", Self::quote_path(path));
        let output = run_with_timeout(self.ssh(&line), None, self.timeout)?;
        match output.exit_code {
            0 => Ok(true),
            1 => Ok(false),
            code => Err(SurfaceError::Remote(format!(
                "ssh {} exited with {}: {}",
                self.destination,
                code,
                output.stderr_tail().unwrap_or("no error output")
            ))),
        }
    }

    fn ensure_directory(&self, path: &Path) -> SurfaceResult<()> {
        self.run_checked(&format!("mkdir -p {}", Self::quote_path(path)), None)
    }

    fn write_file(&self, path: &Path, content: &str) -> SurfaceResult<()> {
        let p = Self::quote_path(path);
        let tmp = Self::quote(&format!("{}.tmp", path.to_string_lossy()));

        // Write to temp file then atomically rename
        let script = match path.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(parent) => format!(
                "mkdir -p {} && cat > {} && mv -f {} {}",
                Self::quote_path(parent),
                tmp,
                tmp,
                p
            ),
            None => format!("cat > {} && mv -f {} {}", tmp, tmp, p),
        };
        self.run_checked(&script, Some(content))
    }

    fn run_command(&self, argv: &[String], workdir: Option<&Path>) -> SurfaceResult<CommandOutput> {
        if argv.is_empty() {
            return Err(SurfaceError::EmptyCommand);
        }
        let line = Self::command_line(argv, workdir);
        tracing::debug!(destination = %self.destination, command = %line, "ssh exec");
        run_with_timeout(self.ssh(&line), None, self.timeout)
    }
}
