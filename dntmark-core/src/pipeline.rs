//! Per-pair orchestration
//!
//! `extract -> link -> rebuild -> density gate -> augment`, with every
//! random draw taken from a generator seeded by `(base seed, pair index)`.
//! A pair's output therefore depends only on its own inputs, whatever the
//! processing order or thread count.

use crate::alignment::AlignmentRelation;
use crate::config::{EngineConfig, LinkingStrategy, TagConfig};
use crate::corpus::PairRecord;
use crate::error::Result;
use crate::gate::{Augmenter, DensityGate};
use crate::lexical::StopWords;
use crate::linker::{
    AlignedLinker, Correspondence, EntityLinker, LinkContext, PairState, ResidualLinker,
    UnalignedLinker,
};
use crate::rebuild::Rebuilder;
use crate::sampler::{scan_markers, PlaceholderSampler};
use crate::sentence::{Side, WorkingSentence};
use crate::tags::{TagSet, Token};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How a pair left the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairStatus {
    /// Rewritten with at least one placeholder
    Substituted,
    /// No correspondence accepted
    Unchanged,
    /// Reverted to its original text by the density gate
    Discarded,
    /// Passed through because its alignment line could not be parsed
    MalformedAlignment,
}

/// Result of processing one sentence pair
#[derive(Debug, Clone)]
pub struct PairOutcome {
    /// Record index
    pub index: usize,
    /// Emitted source sentence
    pub source: String,
    /// Emitted target sentence
    pub target: String,
    /// Accepted correspondences; empty unless substituted
    pub correspondences: Vec<Correspondence>,
    /// Outcome class
    pub status: PairStatus,
    /// Markers in the emitted source, duplicates included
    pub placeholders: usize,
    /// Markers added by augmentation
    pub duplicated: usize,
    /// Untokenized texts to emit ahead of the rewritten pair
    pub originals: Option<(String, String)>,
}

impl PairOutcome {
    fn passthrough(index: usize, source: &[Token], target: &[Token], status: PairStatus) -> Self {
        Self {
            index,
            source: join_tokens(source),
            target: join_tokens(target),
            correspondences: Vec::new(),
            status,
            placeholders: 0,
            duplicated: 0,
            originals: None,
        }
    }

    /// Whether the emitted pair carries placeholders
    pub fn is_substituted(&self) -> bool {
        self.status == PairStatus::Substituted
    }

    /// Lines to write to the source and target outputs
    ///
    /// Without original texts this is the emitted pair. With them, the
    /// original line comes first and the rewritten line follows only when
    /// the pair was substituted.
    pub fn output_lines(&self) -> (Vec<&str>, Vec<&str>) {
        match &self.originals {
            None => (vec![self.source.as_str()], vec![self.target.as_str()]),
            Some((source, target)) if self.is_substituted() => (
                vec![source.as_str(), self.source.as_str()],
                vec![target.as_str(), self.target.as_str()],
            ),
            Some((source, target)) => (vec![source.as_str()], vec![target.as_str()]),
        }
    }
}

fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.word.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive the generator seed of one pair
fn pair_seed(base: u64, index: usize) -> u64 {
    base ^ (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Processes sentence pairs with one fixed configuration
pub struct PairProcessor {
    config: EngineConfig,
    tags: TagSet,
    stops: StopWords,
    linkers: Vec<Box<dyn EntityLinker>>,
    rebuilder: Rebuilder,
    gate: DensityGate,
    augmenter: Augmenter,
    seed: u64,
}

impl PairProcessor {
    /// Create a processor; the linker chain is fixed here, once per corpus
    pub fn new(config: EngineConfig, tag_config: &TagConfig) -> Result<Self> {
        config.validate()?;
        tag_config.validate()?;

        let mut linkers: Vec<Box<dyn EntityLinker>> = Vec::new();
        match config.strategy {
            LinkingStrategy::AlignmentBased => linkers.push(Box::new(AlignedLinker::new())),
            LinkingStrategy::AlignmentFree => linkers.push(Box::new(UnalignedLinker::new())),
        }
        if config.residual_pass {
            linkers.push(Box::new(ResidualLinker::new()));
        }

        let seed = config
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen::<u64>());
        log::info!(
            "engine ready: strategy={:?}, linkers=[{}], seed={seed}",
            config.strategy,
            linkers.iter().map(|l| l.name()).collect::<Vec<_>>().join(", ")
        );

        Ok(Self {
            tags: tag_config.tag_set(),
            stops: tag_config.stop_words(),
            rebuilder: Rebuilder::from_config(&config),
            gate: DensityGate::from_config(&config),
            augmenter: Augmenter::from_config(&config),
            linkers,
            config,
            seed,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Base seed in use
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Process one pair; never fails
    pub fn process(
        &self,
        index: usize,
        source: &[Token],
        target: &[Token],
        alignment: Option<&AlignmentRelation>,
    ) -> PairOutcome {
        let mut rng = StdRng::seed_from_u64(pair_seed(self.seed, index));
        let sampler = PlaceholderSampler::new(source.len(), self.config.pool_floor, &mut rng);
        let (source_sentence, target_sentence) = match alignment {
            Some(relation) => (
                WorkingSentence::with_alignment(source, Side::Source, relation),
                WorkingSentence::with_alignment(target, Side::Target, relation),
            ),
            None => (
                WorkingSentence::new(source, Side::Source),
                WorkingSentence::new(target, Side::Target),
            ),
        };

        let mut state = PairState {
            source_tokens: source,
            target_tokens: target,
            source: source_sentence,
            target: target_sentence,
            sampler,
            correspondences: Vec::new(),
        };
        let ctx = LinkContext {
            config: &self.config,
            tags: &self.tags,
            stops: &self.stops,
        };

        for linker in &self.linkers {
            let accepted = linker.run(&ctx, &mut state, &mut rng);
            log::trace!("pair {index}: {} accepted {accepted}", linker.name());
        }

        if !self.gate.admits(&state.source) {
            log::debug!(
                "pair {index}: discarded at density {:.2}",
                self.gate.density(&state.source)
            );
            return PairOutcome::passthrough(index, source, target, PairStatus::Discarded);
        }

        let rebuilt_source = self.rebuilder.rebuild(&state.source);
        let rebuilt_target = self.rebuilder.rebuild(&state.target);
        if state.correspondences.is_empty() {
            return PairOutcome {
                source: rebuilt_source,
                target: rebuilt_target,
                ..PairOutcome::passthrough(index, &[], &[], PairStatus::Unchanged)
            };
        }

        let pool_range = self.config.pool_floor.max(source.len());
        let (source_text, target_text, duplicated) =
            self.augmenter
                .augment(&rebuilt_source, &rebuilt_target, pool_range, &mut rng);

        PairOutcome {
            index,
            placeholders: scan_markers(&source_text).len(),
            source: source_text,
            target: target_text,
            correspondences: state.correspondences,
            status: PairStatus::Substituted,
            duplicated,
            originals: None,
        }
    }

    /// Process a corpus record, parsing its alignment line first
    ///
    /// Under the alignment-based strategy a malformed alignment line is
    /// logged and the pair passes through unmodified.
    pub fn process_record(&self, record: &PairRecord) -> PairOutcome {
        let relation = match (&self.config.strategy, record.alignment.as_deref()) {
            (LinkingStrategy::AlignmentBased, Some(line)) => match AlignmentRelation::parse(line) {
                Ok(relation) => Some(relation),
                Err(e) => {
                    log::warn!("pair {}: {e}; emitted unmodified", record.index);
                    let mut outcome = PairOutcome::passthrough(
                        record.index,
                        &record.source,
                        &record.target,
                        PairStatus::MalformedAlignment,
                    );
                    outcome.originals = record.originals.clone();
                    return outcome;
                }
            },
            _ => None,
        };

        let mut outcome = self.process(
            record.index,
            &record.source,
            &record.target,
            relation.as_ref(),
        );
        outcome.originals = record.originals.clone();
        outcome
    }

    /// Process a batch of records, in parallel when `threads > 1`
    ///
    /// Outcomes are returned in record order.
    #[cfg(feature = "parallel")]
    pub fn process_batch(&self, records: &[PairRecord], threads: usize) -> Result<Vec<PairOutcome>> {
        if threads <= 1 {
            return Ok(records.iter().map(|r| self.process_record(r)).collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| crate::error::CoreError::Configuration(e.to_string()))?;
        Ok(pool.install(|| records.par_iter().map(|r| self.process_record(r)).collect()))
    }

    /// Process a batch of records sequentially
    #[cfg(not(feature = "parallel"))]
    pub fn process_batch(&self, records: &[PairRecord], _threads: usize) -> Result<Vec<PairOutcome>> {
        Ok(records.iter().map(|r| self.process_record(r)).collect())
    }
}
