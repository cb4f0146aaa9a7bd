//! Output Rendering
//!
//! Renders the final [`ExecutionResult`] and fatal errors. Per-step
//! progress is printed by the event sinks while the plan runs; this module
//! only produces the closing summary.

use crossterm::style::Stylize;

use crate::domain::entities::{ExecutionResult, StepStatus};
use crate::error::ShipwrightError;

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// NDJSON for scripting
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Icons for output rendering
struct Icons {
    check: &'static str,
    cross: &'static str,
    skip: &'static str,
}

impl Icons {
    fn unicode() -> Self {
        Self {
            check: "✓",
            cross: "✗",
            skip: "○",
        }
    }

    fn ascii() -> Self {
        Self {
            check: "[OK]",
            cross: "[FAIL]",
            skip: "[ ]",
        }
    }
}

/// Trait for rendering execution results
pub trait ResultRenderer {
    fn render(&self, result: &ExecutionResult) -> String;
}

/// Text renderer for execution results
pub struct TextRenderer {
    pub color: bool,
    pub unicode: bool,
    pub verbose: u8,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            color: false,
            unicode: true,
            verbose: 0,
        }
    }
}

impl TextRenderer {
    fn paint(&self, text: &str, ok: bool) -> String {
        match (self.color, ok) {
            (false, _) => text.to_string(),
            (true, true) => text.green().to_string(),
            (true, false) => text.red().to_string(),
        }
    }
}

impl ResultRenderer for TextRenderer {
    fn render(&self, result: &ExecutionResult) -> String {
        let icons = if self.unicode {
            Icons::unicode()
        } else {
            Icons::ascii()
        };
        let mut lines = Vec::new();

        if self.verbose > 0 {
            for step in &result.steps {
                let icon = match step.status {
                    StepStatus::Succeeded => icons.check,
                    StepStatus::Failed(_) => icons.cross,
                    StepStatus::Skipped(_) => icons.skip,
                };
                lines.push(format!("  {} [{}] {}", icon, step.index, step.description));
            }
        }

        let headline = if result.dry_run {
            format!(
                "{} Dry run for {} on {}: {} step(s) planned, nothing applied",
                icons.skip,
                result.service,
                result.target,
                result.steps.len()
            )
        } else if let Some(failed) = result.failure() {
            let reason = match &failed.status {
                StepStatus::Failed(reason) => reason.as_str(),
                _ => "",
            };
            self.paint(
                &format!(
                    "{} Deploy of {} to {} failed at step {} ({}): {}; {} step(s) not run",
                    icons.cross,
                    result.service,
                    result.target,
                    failed.index,
                    failed.description,
                    reason,
                    result.not_run
                ),
                false,
            )
        } else {
            self.paint(
                &format!(
                    "{} Deployed {} to {} ({} step(s))",
                    icons.check,
                    result.service,
                    result.target,
                    result.succeeded_count()
                ),
                true,
            )
        };
        lines.push(headline);
        lines.join("\n")
    }
}

/// JSON renderer: one `result` record
pub struct JsonRenderer;

impl ResultRenderer for JsonRenderer {
    fn render(&self, result: &ExecutionResult) -> String {
        result_json(result).to_string()
    }
}

/// Final NDJSON record for a finished deployment
pub fn result_json(result: &ExecutionResult) -> serde_json::Value {
    let mut value = serde_json::to_value(result).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(map) = value.as_object_mut() {
        map.insert("event".to_string(), "result".into());
        map.insert(
            "status".to_string(),
            if result.is_success() { "success" } else { "failed" }.into(),
        );
    }
    value
}

/// Single-line message naming the failed stage
pub fn format_error(err: &ShipwrightError) -> String {
    format!("error[{}]: {}", err.kind().stage(), err)
}

/// NDJSON error record
pub fn error_json(err: &ShipwrightError) -> serde_json::Value {
    serde_json::json!({
        "event": "error",
        "stage": err.kind().stage(),
        "message": err.to_string(),
    })
}

/// Create a renderer based on format
pub fn create_renderer(
    format: OutputFormat,
    color: bool,
    unicode: bool,
    verbose: u8,
) -> Box<dyn ResultRenderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer {
            color,
            unicode,
            verbose,
        }),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}
