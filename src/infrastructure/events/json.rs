//! NDJSON event sink
//!
//! One JSON object per line on stdout, for CI pipelines and scripts.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{DeployEvent, DeployEventSink};

/// Writes each deploy event as a single JSON line
pub struct JsonEventSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Write one line; also used for the final `result` record
    pub fn write_value(&self, value: &serde_json::Value) {
        // A closed stdout must not abort a deployment half way
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{}", value);
            let _ = out.flush();
        }
    }
}

/// JSON form of an event
pub fn event_to_json(event: &DeployEvent) -> serde_json::Value {
    match event {
        DeployEvent::ConfigLoaded {
            path,
            service_count,
            warnings,
        } => serde_json::json!({
            "event": "config_loaded",
            "path": path.display().to_string(),
            "services": service_count,
            "warnings": warnings,
        }),

        DeployEvent::ServiceResolved { service } => serde_json::json!({
            "event": "service_resolved",
            "service": service.name,
            "type": service.service_type.as_str(),
            "host": service.host,
            "port": service.port,
            "requires_secrets": service.requires_secrets,
        }),

        DeployEvent::SecretsResolved {
            service,
            backend,
            keys,
        } => serde_json::json!({
            "event": "secrets_resolved",
            "service": service,
            "backend": backend,
            "keys": keys,
        }),

        DeployEvent::SecretsNotRequired { service } => serde_json::json!({
            "event": "secrets_not_required",
            "service": service,
        }),

        DeployEvent::PlanBuilt {
            service,
            target,
            steps,
            fingerprint,
        } => serde_json::json!({
            "event": "plan_built",
            "service": service,
            "target": target,
            "steps": steps,
            "fingerprint": fingerprint,
        }),

        DeployEvent::StepStarted {
            index,
            total,
            description,
        } => serde_json::json!({
            "event": "step_start",
            "index": index,
            "total": total,
            "description": description,
        }),

        DeployEvent::StepRetrying {
            index,
            attempt,
            reason,
        } => serde_json::json!({
            "event": "step_retry",
            "index": index,
            "attempt": attempt,
            "reason": reason,
        }),

        DeployEvent::StepSucceeded { index, duration_ms } => serde_json::json!({
            "event": "step_succeeded",
            "index": index,
            "duration_ms": duration_ms,
        }),

        DeployEvent::StepFailed { index, reason } => serde_json::json!({
            "event": "step_failed",
            "index": index,
            "reason": reason,
        }),

        DeployEvent::StepSkipped { index, reason } => serde_json::json!({
            "event": "step_skipped",
            "index": index,
            "reason": reason,
        }),

        DeployEvent::Cancelled { remaining } => serde_json::json!({
            "event": "cancelled",
            "remaining": remaining,
        }),

        DeployEvent::Completed {
            service,
            success,
            succeeded,
            failed,
            not_run,
        } => serde_json::json!({
            "event": "complete",
            "service": service,
            "status": if *success { "success" } else { "failed" },
            "succeeded": succeeded,
            "failed": failed,
            "not_run": not_run,
        }),
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.write_value(&event_to_json(&event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Cloneable in-memory stdout
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn json_lines(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_writes_one_line_per_event() {
        let captured = Captured::default();
        let sink = JsonEventSink::with_writer(captured.clone());

        sink.on_event(DeployEvent::StepStarted {
            index: 1,
            total: 4,
            description: "mkdir -p /opt/deployments/api".to_string(),
        });
        sink.on_event(DeployEvent::StepSucceeded {
            index: 1,
            duration_ms: 12,
        });

        let lines = captured.json_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "step_start");
        assert_eq!(lines[0]["total"], 4);
        assert_eq!(lines[1]["duration_ms"], 12);
    }

    #[test]
    fn secrets_resolved_carries_key_names() {
        let value = event_to_json(&DeployEvent::SecretsResolved {
            service: "billing".to_string(),
            backend: "env".to_string(),
            keys: vec!["DB_PASSWORD".to_string()],
        });
        assert_eq!(value["event"], "secrets_resolved");
        assert_eq!(value["keys"], serde_json::json!(["DB_PASSWORD"]));
    }

    #[test]
    fn completed_maps_success_flag_to_status() {
        let value = event_to_json(&DeployEvent::Completed {
            service: "api".to_string(),
            success: false,
            succeeded: 1,
            failed: 1,
            not_run: 2,
        });
        assert_eq!(value["event"], "complete");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["not_run"], 2);
    }
}
