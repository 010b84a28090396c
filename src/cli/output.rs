//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the prism CLI.

use crate::pipeline::{PipelineEvent, RunReport, RunStatus};
use crate::types::{PerspectiveStatus, Role};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the prism banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                "\n   {} {}\n",
                "prism".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!("\n   prism v{}\n", env!("CARGO_PKG_VERSION"));
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a subheader
    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// Print a table header row
    pub fn table_header(&self, columns: &[&str]) {
        let header: String = columns
            .iter()
            .map(|c| format!("{:<12}", c))
            .collect::<Vec<_>>()
            .join(" ");
        if self.colored {
            println!("    {}", header.bright_white().bold());
            println!("    {}", "─".repeat(columns.len() * 13).dimmed());
        } else {
            println!("    {}", header);
            println!("    {}", "-".repeat(columns.len() * 13));
        }
    }

    /// Print a table row
    pub fn table_row(&self, values: &[&str]) {
        let row: String = values
            .iter()
            .map(|v| format!("{:<12}", v))
            .collect::<Vec<_>>()
            .join(" ");
        println!("    {}", row);
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }

    /// One line per streamed pipeline event
    pub fn event(&self, event: &PipelineEvent) {
        let line = match event {
            PipelineEvent::PhaseStarted { phase, .. } => format!("{} started", phase),
            PipelineEvent::PhaseCompleted { stats, .. } => format!(
                "{} completed in {}ms ({} searches, {} cache hits)",
                stats.phase, stats.duration_ms, stats.searches, stats.cache_hits
            ),
            PipelineEvent::PerspectiveCompleted {
                role,
                status,
                latency_ms,
                ..
            } => format!("{} {} in {}ms", role, status_label(*status), latency_ms),
            PipelineEvent::RunFinished {
                status,
                total_duration_ms,
                ..
            } => format!("run {} in {}ms", run_label(*status), total_duration_ms),
        };
        if self.colored {
            println!("  {} {}", "»".dimmed(), line.dimmed());
        } else {
            println!("  [EVENT] {}", line);
        }
    }

    /// Human-readable rendering of a finished run
    pub fn report(&self, report: &RunReport) {
        self.header(&format!("Run {}", report.run_id));
        self.kv("query", &report.query);
        if let Some(analysis) = &report.analysis {
            self.kv("topic", analysis.topic.as_str());
            self.kv("complexity", &analysis.complexity.to_string());
            self.kv("kind", &analysis.kind.to_string());
            self.kv("allocation", &analysis.rationale);
        }

        for role in Role::ALL {
            let Some(result) = report.result(role) else {
                continue;
            };
            self.subheader(&format!("{} ({})", role, role.focus()));
            match (&result.status, result.payload.as_deref()) {
                (PerspectiveStatus::Ok, Some(payload)) => {
                    for line in payload.lines() {
                        println!("    {}", line);
                    }
                }
                _ => self.warning(&format!(
                    "{}: {}",
                    status_label(result.status),
                    result.failure.as_deref().unwrap_or("no payload")
                )),
            }
        }

        if let Some(aggregated) = &report.aggregated {
            if !aggregated.key_themes.is_empty() {
                self.subheader("Key themes");
                for theme in &aggregated.key_themes {
                    self.list_item(theme);
                }
            }
        }

        let stats = &report.statistics;
        self.subheader("Statistics");
        self.table_header(&["phase", "ms", "searches", "cache hits", "failed"]);
        for phase in &stats.phases {
            let cells = [
                phase.phase.to_string(),
                phase.duration_ms.to_string(),
                phase.searches.to_string(),
                phase.cache_hits.to_string(),
                phase.failed_searches.to_string(),
            ];
            self.table_row(&cells.iter().map(String::as_str).collect::<Vec<_>>());
        }
        self.newline();
        self.kv(
            "budget",
            &format!("{}/{} used", stats.budget.consumed, stats.budget.ceiling),
        );
        self.kv(
            "perspectives",
            &format!("{} ok, {} failed", stats.perspectives_ok, stats.perspectives_failed),
        );
        self.kv("total", &format!("{}ms", stats.total_duration_ms));

        match report.status {
            RunStatus::Done => self.success("run completed"),
            RunStatus::Failed => self.error(&format!(
                "run failed: {}",
                report.failure.as_deref().unwrap_or("unknown reason")
            )),
        }
    }
}

fn status_label(status: PerspectiveStatus) -> &'static str {
    match status {
        PerspectiveStatus::Ok => "ok",
        PerspectiveStatus::Failed => "failed",
        PerspectiveStatus::Skipped => "skipped",
    }
}

fn run_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Done => "done",
        RunStatus::Failed => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RunState;
    use crate::search::CacheStats;
    use crate::types::{PerspectiveResult, Query};
    use uuid::Uuid;

    #[test]
    fn test_output_new() {
        assert!(Output::new().colored);
        assert!(!Output::no_color().colored);
        assert!(Output::default().colored);
    }

    #[test]
    fn test_output_methods_no_panic() {
        let output = Output::no_color();

        output.banner();
        output.success("test success");
        output.info("test info");
        output.warning("test warning");
        output.error("test error");
        output.created("config", "prism.toml");
        output.header("Test Header");
        output.subheader("Test Subheader");
        output.kv("key", "value");
        output.list_item("item");
        output.hint("hint message");
        output.command("prism run");
        output.table_header(&["a", "b"]);
        output.table_row(&["1", "2"]);
        output.table_row(&[]);
        output.newline();
    }

    #[test]
    fn test_report_renders_failed_run() {
        let mut state = RunState::new(Uuid::new_v4(), Query::new("q"), 1);
        state
            .record_result(PerspectiveResult::ok(Role::White, "line one\nline two".to_string(), 3, 0))
            .unwrap();
        state.fail("result for red recorded twice");
        let report = state.into_report(4, CacheStats::default());

        Output::no_color().report(&report);
        Output::new().report(&report);
    }

    #[test]
    fn test_event_lines() {
        let output = Output::no_color();
        output.event(&PipelineEvent::PerspectiveCompleted {
            run_id: Uuid::nil(),
            role: Role::Black,
            status: PerspectiveStatus::Failed,
            latency_ms: 60_000,
        });
        output.event(&PipelineEvent::RunFinished {
            run_id: Uuid::nil(),
            status: RunStatus::Done,
            total_duration_ms: 1,
        });
    }
}
