//! Process runner
//!
//! Runs a child process to completion with:
//! - optional stdin payload
//! - stdout/stderr capture
//! - a hard timeout (the child is killed when it expires)
//!
//! The timeout also bounds output collection. A grandchild that keeps the
//! pipes open after the child exits cannot hold the caller past it.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crate::domain::ports::{CommandOutput, SurfaceError, SurfaceResult};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Spawn `cmd`, feed `input`, and wait at most `timeout`
///
/// A non-zero exit status is returned as part of [`CommandOutput`]; only
/// spawn failures and timeouts are errors.
pub fn run_with_timeout(
    mut cmd: Command,
    input: Option<&str>,
    timeout: Duration,
) -> SurfaceResult<CommandOutput> {
    let program = cmd.get_program().to_string_lossy().into_owned();

    cmd.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

    tracing::trace!(program = %program, "spawning");
    let mut child = cmd
        .spawn()
        .map_err(|source| SurfaceError::Spawn { program, source })?;

    // Feed stdin from a detached thread so a child that fills its stdout
    // pipe before draining stdin cannot deadlock us.
    if let (Some(payload), Some(mut stdin)) = (input, child.stdin.take()) {
        let payload = payload.to_string();
        thread::spawn(move || {
            let _ = stdin.write_all(payload.as_bytes());
        });
    }

    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if started.elapsed() >= timeout {
            tracing::warn!("command timed out after {:?}, killing", timeout);
            let _ = child.kill();
            let _ = child.wait();
            return Err(SurfaceError::TimedOut(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    };

    let deadline = started + timeout;
    let stdout = collect(stdout_reader, deadline, timeout)?;
    let stderr = collect(stderr_reader, deadline, timeout)?;

    Ok(CommandOutput {
        // Killed by a signal: no code, report as -1
        exit_code: status.code().unwrap_or(-1),
        stdout,
        stderr,
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Wait for a reader until `deadline`; a reader still blocked then is left
/// behind and the command counts as timed out.
fn collect(
    reader: Option<Receiver<String>>,
    deadline: Instant,
    timeout: Duration,
) -> SurfaceResult<String> {
    let Some(rx) = reader else {
        return Ok(String::new());
    };
    let remaining = deadline.saturating_duration_since(Instant::now());
    match rx.recv_timeout(remaining) {
        Ok(text) => Ok(text),
        Err(mpsc::RecvTimeoutError::Disconnected) => Ok(String::new()),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            tracing::warn!("output still open after {:?}, giving up", timeout);
            Err(SurfaceError::TimedOut(timeout))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn captures_stdout_and_exit_code() {
        let out = run_with_timeout(sh("echo hello; exit 3"), None, Duration::from_secs(5)).unwrap();
        assert_eq!(out.exit_code, 3);
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn feeds_stdin() {
        let out = run_with_timeout(sh("cat"), Some("payload"), Duration::from_secs(5)).unwrap();
        assert!(out.is_success());
        assert_eq!(out.stdout, "payload");
    }

    #[test]
    fn times_out() {
        let err = run_with_timeout(sh("sleep 5"), None, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, SurfaceError::TimedOut(_)));
    }

    #[test]
    fn background_grandchild_cannot_outlive_timeout() {
        let started = Instant::now();
        let err = run_with_timeout(sh("sleep 4 & exit 0"), None, Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, SurfaceError::TimedOut(_)));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let cmd = Command::new("definitely-not-a-real-program-xyz");
        let err = run_with_timeout(cmd, None, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, SurfaceError::Spawn { .. }));
    }
}
