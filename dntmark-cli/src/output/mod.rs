//! Output formatting module

use anyhow::Result;
use dntmark_core::{PlaceholderCounts, RunSummary};
use std::io::Write;

/// Trait for report formatters
pub trait OutputFormatter {
    /// Report the totals of a `process` run
    fn format_summary(&mut self, summary: &RunSummary, seed: u64) -> Result<()>;

    /// Report per-identifier placeholder counts of two output files
    fn format_counts(
        &mut self,
        source: &PlaceholderCounts,
        target: &PlaceholderCounts,
    ) -> Result<()>;

    /// Finalize output
    fn finish(&mut self) -> Result<()>;
}

/// Report format selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Human-readable lines
    Text,
    /// One JSON document
    Json,
}

impl ReportFormat {
    /// Parse the `[output] format` value of a config file
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    /// Build the formatter for this format
    pub fn formatter<'a, W: Write + 'a>(self, writer: W) -> Box<dyn OutputFormatter + 'a> {
        match self {
            ReportFormat::Text => Box::new(TextFormatter::new(writer)),
            ReportFormat::Json => Box::new(JsonFormatter::new(writer)),
        }
    }
}

pub mod corpus;
pub mod json;
pub mod text;

pub use corpus::CorpusWriter;
pub use json::JsonFormatter;
pub use text::TextFormatter;
