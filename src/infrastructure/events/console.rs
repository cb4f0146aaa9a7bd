//! Console Event Sink
//!
//! Human-readable progress on stderr. Stdout stays free for the final
//! summary so it can be piped.

use std::io::{self, Write};
use std::sync::Mutex;

use crossterm::style::Stylize;

use crate::domain::ports::{DeployEvent, DeployEventSink};

/// Event sink printing one line per step transition
pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    color: bool,
    verbose: u8,
}

impl ConsoleEventSink {
    pub fn stderr(color: bool, verbose: u8) -> Self {
        Self::with_writer(io::stderr(), color, verbose)
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, color: bool, verbose: u8) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            color,
            verbose,
        }
    }

    fn ok(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    fn fail(&self, text: &str) -> String {
        if self.color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dark_grey().to_string()
        } else {
            text.to_string()
        }
    }

    fn render(&self, event: &DeployEvent) -> Option<String> {
        match event {
            DeployEvent::ConfigLoaded { warnings, .. } if !warnings.is_empty() => Some(
                warnings
                    .iter()
                    .map(|w| format!("warning: {}", w))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            DeployEvent::ConfigLoaded {
                path,
                service_count,
                ..
            } if self.verbose > 0 => Some(self.dim(&format!(
                "loaded {} service(s) from {}",
                service_count,
                path.display()
            ))),
            DeployEvent::ConfigLoaded { .. } => None,

            DeployEvent::ServiceResolved { service } => Some(format!(
                "Deploying {} ({})",
                service.name, service.service_type
            )),

            DeployEvent::SecretsResolved { backend, keys, .. } => Some(format!(
                "  secrets from {}: {}",
                backend,
                if keys.is_empty() {
                    "(none)".to_string()
                } else {
                    keys.join(", ")
                }
            )),
            DeployEvent::SecretsNotRequired { .. } => {
                Some(self.dim("  secrets not required"))
            }

            DeployEvent::PlanBuilt {
                target,
                steps,
                fingerprint,
                ..
            } => Some(format!(
                "  target {}, {} step(s), plan {}",
                target,
                steps.len(),
                self.dim(fingerprint)
            )),

            DeployEvent::StepStarted {
                index,
                total,
                description,
            } => Some(format!("[{}/{}] {}", index, total, description)),

            DeployEvent::StepRetrying {
                index,
                attempt,
                reason,
            } => Some(format!(
                "      step {} failed ({}), retry {}",
                index, reason, attempt
            )),

            DeployEvent::StepSucceeded { duration_ms, .. } => {
                Some(format!("      {} {}", self.ok("ok"), self.dim(&format!("{}ms", duration_ms))))
            }

            DeployEvent::StepFailed { reason, .. } => {
                Some(format!("      {} {}", self.fail("failed:"), reason))
            }

            DeployEvent::StepSkipped { index, reason } => {
                Some(self.dim(&format!("      step {} skipped ({})", index, reason)))
            }

            DeployEvent::Cancelled { remaining } => Some(self.fail(&format!(
                "cancelled, {} step(s) not run",
                remaining
            ))),

            // The presentation layer prints the summary line
            DeployEvent::Completed { .. } => None,
        }
    }
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        if let Some(line) = self.render(&event) {
            if let Ok(mut writer) = self.writer.lock() {
                let _ = writeln!(writer, "{}", line);
            }
        }
    }
}
