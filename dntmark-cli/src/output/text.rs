//! Plain text report formatter

use super::OutputFormatter;
use anyhow::Result;
use dntmark_core::{PlaceholderCounts, RunSummary};
use std::io::{self, Write};

/// Plain text formatter - one `key: value` line per figure
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl TextFormatter<io::Stdout> {
    /// Create a formatter that writes to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> OutputFormatter for TextFormatter<W> {
    fn format_summary(&mut self, summary: &RunSummary, seed: u64) -> Result<()> {
        let w = &mut self.writer;
        writeln!(w, "pairs: {}", summary.pairs)?;
        writeln!(w, "substituted: {}", summary.substituted)?;
        writeln!(w, "unchanged: {}", summary.unchanged)?;
        writeln!(
            w,
            "discarded: {} ({:.2}%)",
            summary.discarded,
            summary.discard_rate() * 100.0
        )?;
        writeln!(w, "malformed alignments: {}", summary.malformed_alignments)?;
        writeln!(w, "correspondences: {}", summary.correspondences)?;
        writeln!(w, "placeholders: {}", summary.placeholders)?;
        writeln!(w, "duplicated: {}", summary.duplicated)?;
        writeln!(w, "seed: {seed}")?;
        Ok(())
    }

    fn format_counts(
        &mut self,
        source: &PlaceholderCounts,
        target: &PlaceholderCounts,
    ) -> Result<()> {
        let w = &mut self.writer;
        let mut ids: Vec<u32> = source.counts.keys().chain(target.counts.keys()).copied().collect();
        ids.sort_unstable();
        ids.dedup();

        for id in ids {
            let here = source.counts.get(&id).copied().unwrap_or(0);
            let there = target.counts.get(&id).copied().unwrap_or(0);
            let flag = if here == there { "" } else { "  MISMATCH" };
            writeln!(w, "${{DNT0}}{id}\t{here}\t{there}{flag}")?;
        }
        writeln!(w, "lines: {} / {}", source.lines, target.lines)?;
        writeln!(w, "total: {} / {}", source.total(), target.total())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
