//! JSON report formatter

use super::OutputFormatter;
use anyhow::Result;
use dntmark_core::{PlaceholderCounts, RunSummary};
use serde::Serialize;
use std::io::Write;

/// JSON formatter - collects reports and writes one pretty document
pub struct JsonFormatter<W: Write> {
    writer: W,
    report: Report,
}

/// Data structure for JSON output
#[derive(Debug, Default, Serialize)]
pub struct Report {
    /// Run totals, for `process`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryData>,
    /// Marker counts of both sides, for `count`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<CountsData>,
}

/// Run totals with the seed that reproduces them
#[derive(Debug, Serialize)]
pub struct SummaryData {
    /// Totals
    #[serde(flatten)]
    pub totals: RunSummary,
    /// Base seed
    pub seed: u64,
}

/// Marker counts with their differences
#[derive(Debug, Serialize)]
pub struct CountsData {
    /// Source side
    pub source: PlaceholderCounts,
    /// Target side
    pub target: PlaceholderCounts,
    /// `(id, source, target)` for every differing identifier
    pub differences: Vec<(u32, usize, usize)>,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            report: Report::default(),
        }
    }
}

impl<W: Write> OutputFormatter for JsonFormatter<W> {
    fn format_summary(&mut self, summary: &RunSummary, seed: u64) -> Result<()> {
        self.report.summary = Some(SummaryData {
            totals: summary.clone(),
            seed,
        });
        Ok(())
    }

    fn format_counts(
        &mut self,
        source: &PlaceholderCounts,
        target: &PlaceholderCounts,
    ) -> Result<()> {
        self.report.counts = Some(CountsData {
            differences: source.differences(target),
            source: source.clone(),
            target: target.clone(),
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.report)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_document() {
        let summary = RunSummary {
            pairs: 3,
            substituted: 1,
            ..RunSummary::default()
        };
        let mut out = Vec::new();
        {
            let mut formatter = JsonFormatter::new(&mut out);
            formatter.format_summary(&summary, 5).unwrap();
            formatter.finish().unwrap();
        }

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["summary"]["pairs"], 3);
        assert_eq!(value["summary"]["seed"], 5);
        assert!(value.get("counts").is_none());
    }
}
