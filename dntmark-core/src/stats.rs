//! Placeholder accounting
//!
//! Every placeholder written to the source file must appear the same number
//! of times in the target file. [`PlaceholderCounts`] tallies markers per
//! identifier for one file; [`RunSummary`] aggregates pair outcomes.

use crate::error::Result;
use crate::pipeline::{PairOutcome, PairStatus};
use crate::sampler::scan_markers;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::BufRead;

/// Marker multiset of one rewritten file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaceholderCounts {
    /// Occurrences per identifier
    pub counts: BTreeMap<u32, usize>,
    /// Lines scanned
    pub lines: usize,
}

impl PlaceholderCounts {
    /// Create empty counts
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the markers of one line
    pub fn add_line(&mut self, line: &str) {
        self.lines += 1;
        for placeholder in scan_markers(line) {
            *self.counts.entry(placeholder.id()).or_insert(0) += 1;
        }
    }

    /// Count every line of a reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut counts = Self::new();
        for line in reader.lines() {
            counts.add_line(&line?);
        }
        Ok(counts)
    }

    /// Total number of markers
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Identifiers whose counts differ, as `(id, here, there)`
    pub fn differences(&self, other: &Self) -> Vec<(u32, usize, usize)> {
        let mut ids: Vec<u32> = self.counts.keys().chain(other.counts.keys()).copied().collect();
        ids.sort_unstable();
        ids.dedup();

        ids.into_iter()
            .filter_map(|id| {
                let here = self.counts.get(&id).copied().unwrap_or(0);
                let there = other.counts.get(&id).copied().unwrap_or(0);
                (here != there).then_some((id, here, there))
            })
            .collect()
    }

    /// Same line count and same marker multiset
    pub fn matches(&self, other: &Self) -> bool {
        self.lines == other.lines && self.counts == other.counts
    }
}

/// Totals over a processed corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Pairs read
    pub pairs: usize,
    /// Pairs emitted with at least one placeholder
    pub substituted: usize,
    /// Pairs emitted without any placeholder
    pub unchanged: usize,
    /// Pairs reverted by the density gate
    pub discarded: usize,
    /// Pairs passed through because of a malformed alignment line
    pub malformed_alignments: usize,
    /// Accepted correspondences
    pub correspondences: usize,
    /// Placeholder markers in the source output, duplicates included
    pub placeholders: usize,
    /// Markers added by augmentation
    pub duplicated: usize,
}

impl RunSummary {
    /// Fold one pair outcome into the totals
    pub fn record(&mut self, outcome: &PairOutcome) {
        self.pairs += 1;
        match outcome.status {
            PairStatus::Substituted => self.substituted += 1,
            PairStatus::Unchanged => self.unchanged += 1,
            PairStatus::Discarded => self.discarded += 1,
            PairStatus::MalformedAlignment => self.malformed_alignments += 1,
        }
        self.correspondences += outcome.correspondences.len();
        self.placeholders += outcome.placeholders;
        self.duplicated += outcome.duplicated;
    }

    /// Share of pairs reverted by the density gate
    pub fn discard_rate(&self) -> f64 {
        if self.pairs == 0 {
            0.0
        } else {
            self.discarded as f64 / self.pairs as f64
        }
    }
}
