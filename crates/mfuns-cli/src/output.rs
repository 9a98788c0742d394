//! Output formatting for CLI

use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Something with a human readable rendering
pub trait Report: Serialize {
    fn text(&self) -> String;
}

/// Format output based on selected format
pub fn format_output<T: Report>(data: &T, format: &str) -> anyhow::Result<String> {
    match OutputFormat::from(format) {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::Text => Ok(data.text()),
    }
}
