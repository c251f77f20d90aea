//! Output formatting for multiple formats
//!
//! Formatters for JSON, YAML, and human-readable text, used by the `health`
//! subcommand. Server responses themselves are plain wire text and never go
//! through here.

use anyhow::{Context, Result};
use serde::Serialize;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Result of a `health` probe against a running server.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Address that was probed, `host:port`.
    pub endpoint: String,
    /// Whether the server answered `PING` with `PONG`.
    pub reachable: bool,
    /// Round-trip time of the probe, when it succeeded.
    pub latency_ms: Option<u64>,
    /// Human-readable outcome.
    pub message: String,
}

/// Output formatter for health results
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Creates a new output formatter with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a health status according to the configured format
    pub fn format_health(&self, status: &HealthStatus) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(status).context("Failed to serialize health to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(status).context("Failed to serialize health to YAML")
            }
            OutputFormat::Human => Ok(self.format_health_human(status)),
        }
    }

    fn format_health_human(&self, status: &HealthStatus) -> String {
        let verdict = if status.reachable { "OK" } else { "UNREACHABLE" };
        let mut out = format!("{}: {}", status.endpoint, verdict);
        if let Some(ms) = status.latency_ms {
            out.push_str(&format!(" ({}ms)", ms));
        }
        out.push_str(&format!("\n  {}", status.message));
        out
    }
}
