//! Output formatting module for Netauto
//!
//! Provides colored terminal output and a line-delimited JSON mode for
//! scripting. Human output goes to stdout, diagnostics to stderr.

use colored::Colorize;
use indexmap::IndexMap;
use serde_json::json;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Per-host check status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Host matches its intended state
    Ok,
    /// Host configuration drifted
    Drift,
    /// Check could not be completed
    Failed,
    /// Check was not run
    Skipped,
}

impl CheckStatus {
    /// Get the colored string representation
    pub fn colored_string(&self) -> String {
        match self {
            CheckStatus::Ok => "ok".green().to_string(),
            CheckStatus::Drift => "drift".yellow().bold().to_string(),
            CheckStatus::Failed => "failed".red().bold().to_string(),
            CheckStatus::Skipped => "skipping".cyan().to_string(),
        }
    }

    /// Get the plain string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Drift => "drift",
            CheckStatus::Failed => "failed",
            CheckStatus::Skipped => "skipping",
        }
    }
}

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// JSON output mode
    json_mode: bool,
    /// Verbosity level
    verbosity: u8,
    /// Start time for duration calculations
    start_time: Instant,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, json_mode: bool, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();
        colored::control::set_override(use_color);

        Self {
            use_color,
            json_mode,
            verbosity,
            start_time: Instant::now(),
        }
    }

    /// True in JSON mode
    pub fn is_json(&self) -> bool {
        self.json_mode
    }

    /// Print a banner/header
    pub fn banner(&self, title: &str) {
        if self.json_mode {
            return;
        }

        let line = "=".repeat(title.len() + 4);
        if self.use_color {
            println!("\n{}", line.bright_blue());
            println!("{}", format!("  {}  ", title).bright_blue().bold());
            println!("{}\n", line.bright_blue());
        } else {
            println!("\n{}", line);
            println!("  {}  ", title);
            println!("{}\n", line);
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.json_mode {
            return;
        }

        if self.use_color {
            println!("\n{}", title.cyan().bold());
            println!("{}", "-".repeat(title.len()).cyan());
        } else {
            println!("\n{}", title);
            println!("{}", "-".repeat(title.len()));
        }
    }

    /// Print the result of one host
    pub fn host_result(&self, host: &str, status: CheckStatus, message: Option<&str>) {
        if self.json_mode {
            emit(&json!({
                "host": host,
                "status": status.as_str(),
                "message": message
            }));
            return;
        }

        let status_str = if self.use_color {
            status.colored_string()
        } else {
            status.as_str().to_string()
        };

        let host_str = if self.use_color {
            host.bright_white().bold().to_string()
        } else {
            host.to_string()
        };

        print!("{}: [{}]", status_str, host_str);
        if let Some(msg) = message {
            print!(" => {}", msg);
        }
        println!();
    }

    /// Print a recap of host results
    pub fn recap(&self, stats: &RecapStats) {
        if self.json_mode {
            emit(&json!({ "type": "recap", "hosts": stats.hosts }));
            return;
        }

        let header = "RECAP";
        let stars = "*".repeat(80 - header.len());

        if self.use_color {
            println!(
                "\n{} {}",
                header.bright_white().bold(),
                stars.bright_black()
            );
        } else {
            println!("\n{} {}", header, stars);
        }

        for (host, host_stats) in &stats.hosts {
            if self.use_color {
                let host_colored = if host_stats.failed > 0 {
                    host.red().bold()
                } else if host_stats.drift > 0 {
                    host.yellow()
                } else {
                    host.green()
                };

                // Dim if zero, colored if non-zero
                let fmt_stat = |label: &str, value: u32, color: colored::Color| -> String {
                    if value > 0 {
                        format!("{}={:<4}", label.color(color), value)
                    } else {
                        format!("{}={:<4}", label, value).dimmed().to_string()
                    }
                };

                println!(
                    "{:<30} : {} {} {} {}",
                    host_colored,
                    fmt_stat("ok", host_stats.ok, colored::Color::Green),
                    fmt_stat("drift", host_stats.drift, colored::Color::Yellow),
                    fmt_stat("failed", host_stats.failed, colored::Color::Red),
                    fmt_stat("skipped", host_stats.skipped, colored::Color::Cyan),
                );
            } else {
                println!(
                    "{:<30} : ok={:<4} drift={:<4} failed={:<4} skipped={:<4}",
                    host, host_stats.ok, host_stats.drift, host_stats.failed, host_stats.skipped
                );
            }
        }

        let duration_str = format_duration(self.start_time.elapsed());
        if self.use_color {
            println!(
                "\n{} {}",
                "Run took".bright_black(),
                duration_str.bright_white()
            );
        } else {
            println!("\nRun took {}", duration_str);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.json_mode {
            emit_err(&json!({ "type": "error", "message": message }));
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.json_mode {
            emit_err(&json!({ "type": "warning", "message": message }));
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print an info message (respects verbosity)
    pub fn info(&self, message: &str) {
        if self.verbosity < 1 {
            return;
        }

        if self.json_mode {
            emit(&json!({ "type": "info", "message": message }));
            return;
        }

        if self.use_color {
            println!("{} {}", "INFO:".blue(), message);
        } else {
            println!("INFO: {}", message);
        }
    }

    /// Print a result line (always shown, no prefix)
    pub fn plain(&self, message: &str) {
        if self.json_mode {
            emit(&json!({ "type": "message", "message": message }));
            return;
        }

        println!("{}", message);
    }

    /// Print a success line (always shown)
    pub fn success(&self, message: &str) {
        if self.json_mode {
            emit(&json!({ "type": "success", "message": message }));
            return;
        }

        if self.use_color {
            println!("{}", message.green().bold());
        } else {
            println!("{}", message);
        }
    }

    /// Print a debug message (requires higher verbosity)
    pub fn debug(&self, message: &str) {
        if self.verbosity < 2 {
            return;
        }

        if self.json_mode {
            emit(&json!({ "type": "debug", "message": message }));
            return;
        }

        if self.use_color {
            println!("{} {}", "DEBUG:".magenta(), message);
        } else {
            println!("DEBUG: {}", message);
        }
    }

    /// Print a unified diff
    pub fn diff(&self, host: &str, unified: &str) {
        if self.json_mode {
            emit(&json!({ "type": "diff", "host": host, "diff": unified }));
            return;
        }

        if self.use_color {
            print!("{}", netauto::diff::colorize(unified));
        } else {
            print!("{}", unified);
        }
        if !unified.ends_with('\n') {
            println!();
        }
    }

    /// Print an arbitrary serializable document (JSON mode) or a text body
    pub fn document(&self, value: &serde_json::Value, text: &str) {
        if self.json_mode {
            println!("{:#}", value);
        } else {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
        }
    }

    /// Print a list of items
    pub fn list(&self, title: &str, items: &[String]) {
        if self.json_mode {
            println!(
                "{:#}",
                json!({ "type": "list", "title": title, "items": items })
            );
            return;
        }

        if self.use_color {
            println!("\n{}:", title.bright_white().bold());
        } else {
            println!("\n{}:", title);
        }

        for item in items {
            if self.use_color {
                println!("  {} {}", "-".bright_black(), item);
            } else {
                println!("  - {}", item);
            }
        }
    }

    /// Print a table
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        if self.json_mode {
            println!(
                "{:#}",
                json!({ "type": "table", "headers": headers, "rows": rows })
            );
            return;
        }

        // Calculate column widths
        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_line = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" | ");

        if self.use_color {
            println!("{}", header_line.bright_white().bold());
        } else {
            println!("{}", header_line);
        }

        let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        if self.use_color {
            println!("{}", sep.join("-+-").bright_black());
        } else {
            println!("{}", sep.join("-+-"));
        }

        for row in rows {
            let row_line = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" | ");
            println!("{}", row_line);
        }
    }

    /// Flush stdout
    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

fn emit(value: &serde_json::Value) {
    println!("{}", value);
}

fn emit_err(value: &serde_json::Value) {
    eprintln!("{}", value);
}

/// Statistics for a single host
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct HostStats {
    /// Checks that passed
    pub ok: u32,
    /// Checks that found drift
    pub drift: u32,
    /// Checks that could not complete
    pub failed: u32,
    /// Checks that were skipped
    pub skipped: u32,
}

impl HostStats {
    /// Record a check status
    pub fn record(&mut self, status: CheckStatus) {
        match status {
            CheckStatus::Ok => self.ok += 1,
            CheckStatus::Drift => self.drift += 1,
            CheckStatus::Failed => self.failed += 1,
            CheckStatus::Skipped => self.skipped += 1,
        }
    }
}

/// Recap statistics for all hosts, in first-seen order
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RecapStats {
    /// Per-host counters
    pub hosts: IndexMap<String, HostStats>,
}

impl RecapStats {
    /// Create new empty recap stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result for a host
    pub fn record(&mut self, host: &str, status: CheckStatus) {
        self.hosts
            .entry(host.to_string())
            .or_default()
            .record(status);
    }
}

/// Format a duration as a human-readable string
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status_display() {
        assert_eq!(CheckStatus::Ok.as_str(), "ok");
        assert_eq!(CheckStatus::Drift.as_str(), "drift");
        assert_eq!(CheckStatus::Skipped.as_str(), "skipping");
        assert!(CheckStatus::Failed.colored_string().contains("failed"));
    }

    #[test]
    fn test_recap_stats() {
        let mut recap = RecapStats::new();
        recap.record("r2", CheckStatus::Ok);
        recap.record("r1", CheckStatus::Drift);
        recap.record("r1", CheckStatus::Ok);

        let order: Vec<_> = recap.hosts.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["r2", "r1"]);
        assert_eq!(recap.hosts["r1"].drift, 1);
        assert_eq!(recap.hosts["r1"].ok, 1);
        assert_eq!(recap.hosts["r2"].drift, 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }
}
