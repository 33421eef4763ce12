//! Entity correspondence linkers
//!
//! Each linker walks the candidate entities of a pair, decides whether a
//! candidate has a counterpart on the other side, and on acceptance collapses
//! both spans onto one shared placeholder. A rejected candidate is left
//! untouched; rejection is an ordinary outcome, never an error.

mod aligned;
mod residual;
mod unaligned;

pub use aligned::AlignedLinker;
pub use residual::ResidualLinker;
pub use unaligned::UnalignedLinker;

use crate::config::EngineConfig;
use crate::extract::SpanIndices;
use crate::lexical::StopWords;
use crate::sampler::{Placeholder, PlaceholderSampler};
use crate::sentence::{Side, WorkingSentence};
use crate::tags::{TagSet, Token, OUTSIDE_LABEL};
use rand::{Rng, RngCore};
use serde::Serialize;
use std::fmt;

/// Which pass accepted a correspondence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    /// Multi-token span followed through the alignment
    AlignedSpan,
    /// Single token matched through the alignment
    AlignedToken,
    /// Identical normalized subsequence
    Subsequence,
    /// Residual lexically identical token
    Residual,
}

/// An accepted correspondence, kept for the run log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correspondence {
    /// Pass that accepted it
    pub kind: LinkKind,
    /// Placeholder shared by both spans
    pub placeholder: u32,
    /// Class of the source span
    pub source_class: String,
    /// Source surface text
    pub source_text: String,
    /// Class of the target span
    pub target_class: String,
    /// Target surface text
    pub target_text: String,
}

impl fmt::Display for Correspondence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}][{}] -> [{}][{}]",
            self.source_class, self.source_text, self.target_class, self.target_text
        )
    }
}

/// Why a candidate was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The per-entity acceptance draw failed
    SampledOut,
    /// Part of the candidate was consumed by an earlier link
    AlreadyConsumed,
    /// The first token has no alignment link
    NoLink,
    /// The anchor is skipped or already a placeholder
    AnchorUnavailable,
    /// The anchor class does not satisfy the class policy
    ClassMismatch,
    /// The target text is a single symbol
    SingleSymbol,
    /// Token counts differ by the configured factor or more
    SpanRatio,
    /// Source and target have different character composition
    TypeMismatch,
    /// Too short or not alphanumeric
    Implausible,
    /// No aligned candidate survived the filters
    NoCandidate,
    /// No window on the other side matches
    NoMatch,
    /// Repeated occurrences match a different number of windows
    OccurrenceMismatch,
    /// The placeholder pool is empty
    PoolExhausted,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::SampledOut => "sampled out",
            Rejection::AlreadyConsumed => "already consumed",
            Rejection::NoLink => "no alignment link",
            Rejection::AnchorUnavailable => "anchor unavailable",
            Rejection::ClassMismatch => "class mismatch",
            Rejection::SingleSymbol => "single symbol",
            Rejection::SpanRatio => "span length ratio",
            Rejection::TypeMismatch => "type mismatch",
            Rejection::Implausible => "implausible word",
            Rejection::NoCandidate => "no candidate",
            Rejection::NoMatch => "no matching window",
            Rejection::OccurrenceMismatch => "occurrence count mismatch",
            Rejection::PoolExhausted => "placeholder pool exhausted",
        };
        f.write_str(reason)
    }
}

/// Read-only inputs shared by every linker
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    /// Engine configuration
    pub config: &'a EngineConfig,
    /// Admitted and wildcard classes
    pub tags: &'a TagSet,
    /// Stopwords of both languages
    pub stops: &'a StopWords,
}

/// Mutable state of one sentence pair while linkers run
#[derive(Debug)]
pub struct PairState<'a> {
    /// Source tokens as tagged
    pub source_tokens: &'a [Token],
    /// Target tokens as tagged
    pub target_tokens: &'a [Token],
    /// Source working sentence
    pub source: WorkingSentence,
    /// Target working sentence
    pub target: WorkingSentence,
    /// Identifier pool of this pair
    pub sampler: PlaceholderSampler,
    /// Accepted correspondences in acceptance order
    pub correspondences: Vec<Correspondence>,
}

impl<'a> PairState<'a> {
    /// Tokens of one side
    pub fn tokens(&self, side: Side) -> &'a [Token] {
        match side {
            Side::Source => self.source_tokens,
            Side::Target => self.target_tokens,
        }
    }

    /// Working sentence of one side
    pub fn sentence(&self, side: Side) -> &WorkingSentence {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    /// Draw a placeholder and collapse both spans onto it
    pub(crate) fn substitute(
        &mut self,
        source: &[usize],
        target: &[usize],
        describe: impl FnOnce(Placeholder) -> Correspondence,
    ) -> Result<Placeholder, Rejection> {
        let placeholder = self
            .sampler
            .next_placeholder()
            .ok_or(Rejection::PoolExhausted)?;
        self.source.collapse(source, placeholder);
        self.target.collapse(target, placeholder);
        self.correspondences.push(describe(placeholder));
        Ok(placeholder)
    }
}

/// A pass over the candidate entities of one pair
pub trait EntityLinker: Send + Sync {
    /// Run the pass, returning the number of accepted correspondences
    fn run(&self, ctx: &LinkContext<'_>, state: &mut PairState<'_>, rng: &mut dyn RngCore)
        -> usize;

    /// Linker name for logs
    fn name(&self) -> &'static str;
}

/// Independent acceptance draw with probability `p`
pub(crate) fn accept(rng: &mut dyn RngCore, p: f64) -> bool {
    rng.gen::<f64>() < p
}

/// Space-joined words at `indices`
pub(crate) fn join_words(tokens: &[Token], indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&i| tokens[i].word.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Class label of the token at `index`, or `O`
pub(crate) fn class_label(tokens: &[Token], index: usize) -> String {
    tokens
        .get(index)
        .and_then(|t| t.tag.class())
        .unwrap_or(OUTSIDE_LABEL)
        .to_string()
}

pub(crate) fn span_of(index: usize) -> SpanIndices {
    let mut span = SpanIndices::new();
    span.push(index);
    span
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::alignment::AlignmentRelation;

    pub fn tag_set() -> TagSet {
        TagSet::new(
            ["LOC", "PERSON", "GPE", "ORG", "FAC", "NORP", "PRODUCT"],
            ["ORG", "PRODUCT"],
        )
    }

    pub fn stops() -> StopWords {
        StopWords::new(["the", "of", "and", "il", "di", "e", "la"])
    }

    pub fn state<'a>(
        source: &'a [Token],
        target: &'a [Token],
        alignment: Option<&AlignmentRelation>,
        pool: Vec<u32>,
    ) -> PairState<'a> {
        let (src, trg) = match alignment {
            Some(relation) => (
                WorkingSentence::with_alignment(source, Side::Source, relation),
                WorkingSentence::with_alignment(target, Side::Target, relation),
            ),
            None => (
                WorkingSentence::new(source, Side::Source),
                WorkingSentence::new(target, Side::Target),
            ),
        };
        PairState {
            source_tokens: source,
            target_tokens: target,
            source: src,
            target: trg,
            sampler: PlaceholderSampler::from_pool(pool),
            correspondences: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correspondence_log_format() {
        let c = Correspondence {
            kind: LinkKind::AlignedSpan,
            placeholder: 4,
            source_class: "LOC".into(),
            source_text: "New York".into(),
            target_class: "GPE".into(),
            target_text: "Nuova York".into(),
        };
        assert_eq!(c.to_string(), "[LOC][New York] -> [GPE][Nuova York]");
    }

    #[test]
    fn test_accept_bounds() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..100).all(|_| accept(&mut rng, 1.0)));
        assert!((0..100).all(|_| !accept(&mut rng, 0.0)));
    }
}
