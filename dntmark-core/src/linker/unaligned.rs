//! Alignment-free linking
//!
//! Entities found on one side are searched on the other side as windows of
//! the same length holding the same multiset of normalized words. The pass
//! runs source to target, then target to source.

use super::{
    accept, class_label, join_words, Correspondence, EntityLinker, LinkContext, LinkKind,
    PairState, Rejection,
};
use crate::extract::{group_entities, EntityGroup, SpanIndices};
use crate::lexical::normalize;
use crate::sentence::{Side, WorkingSentence};
use crate::tags::Token;
use rand::RngCore;

/// Exact normalized subsequence search in both directions
#[derive(Debug, Clone, Copy, Default)]
pub struct UnalignedLinker;

impl UnalignedLinker {
    /// Create the linker
    pub fn new() -> Self {
        Self
    }

    fn pass(
        &self,
        ctx: &LinkContext<'_>,
        state: &mut PairState<'_>,
        rng: &mut dyn RngCore,
        from: Side,
        probability: f64,
    ) -> usize {
        let mut accepted = 0;

        for group in group_entities(state.tokens(from), ctx.tags, ctx.stops) {
            if !accept(rng, probability) {
                log::debug!("{}: skipped [{}]: {}", self.name(), group.surface, Rejection::SampledOut);
                continue;
            }
            match self.link_group(state, &group, from) {
                Ok(n) => accepted += n,
                Err(reason) => {
                    log::debug!("{}: skipped [{}]: {reason}", self.name(), group.surface)
                }
            }
        }

        accepted
    }

    fn link_group(
        &self,
        state: &mut PairState<'_>,
        group: &EntityGroup,
        from: Side,
    ) -> Result<usize, Rejection> {
        let to = from.opposite();
        let occurrences: Vec<&SpanIndices> = group
            .occurrences
            .iter()
            .filter(|indices| state.sentence(from).all_available(indices))
            .collect();
        if occurrences.is_empty() {
            return Err(Rejection::AlreadyConsumed);
        }

        let windows = find_windows(state.sentence(to), state.tokens(to), &group.normalized);
        let pairs: Vec<(&SpanIndices, &SpanIndices)> = match (occurrences.len(), windows.len()) {
            (_, 0) => return Err(Rejection::NoMatch),
            (1, _) => vec![(occurrences[0], &windows[0])],
            (k, w) if k == w => occurrences.iter().copied().zip(windows.iter()).collect(),
            _ => return Err(Rejection::OccurrenceMismatch),
        };

        let from_tokens = state.tokens(from);
        let to_tokens = state.tokens(to);
        let mut accepted = 0;

        for (occurrence, window) in pairs {
            let from_class = group.class.clone();
            let from_text = join_words(from_tokens, occurrence);
            let to_class = class_label(to_tokens, window[0]);
            let to_text = join_words(to_tokens, window);

            let result = match from {
                Side::Source => state.substitute(occurrence, window, |placeholder| {
                    Correspondence {
                        kind: LinkKind::Subsequence,
                        placeholder: placeholder.id(),
                        source_class: from_class,
                        source_text: from_text,
                        target_class: to_class,
                        target_text: to_text,
                    }
                }),
                Side::Target => state.substitute(window, occurrence, |placeholder| {
                    Correspondence {
                        kind: LinkKind::Subsequence,
                        placeholder: placeholder.id(),
                        source_class: to_class,
                        source_text: to_text,
                        target_class: from_class,
                        target_text: from_text,
                    }
                }),
            };

            match result {
                Ok(_) => accepted += 1,
                Err(reason) if accepted == 0 => return Err(reason),
                Err(reason) => {
                    log::debug!("{}: stopped [{}]: {reason}", self.name(), group.surface);
                    break;
                }
            }
        }

        Ok(accepted)
    }
}

/// Non-overlapping windows of available positions matching `words` as a multiset
fn find_windows(sentence: &WorkingSentence, tokens: &[Token], words: &[String]) -> Vec<SpanIndices> {
    let width = words.len();
    let mut windows = Vec::new();
    if width == 0 || tokens.len() < width {
        return windows;
    }

    let mut expected: Vec<&str> = words.iter().map(String::as_str).collect();
    expected.sort_unstable();

    let mut start = 0;
    while start + width <= tokens.len() {
        let indices: SpanIndices = (start..start + width).collect();
        if sentence.all_available(&indices) {
            let folded: Vec<String> = indices.iter().map(|&i| normalize(&tokens[i].word)).collect();
            let mut found: Vec<&str> = folded.iter().map(String::as_str).collect();
            found.sort_unstable();
            if found == expected {
                windows.push(indices);
                start += width;
                continue;
            }
        }
        start += 1;
    }

    windows
}

impl EntityLinker for UnalignedLinker {
    fn run(
        &self,
        ctx: &LinkContext<'_>,
        state: &mut PairState<'_>,
        rng: &mut dyn RngCore,
    ) -> usize {
        let forward = self.pass(ctx, state, rng, Side::Source, ctx.config.link_probability);
        let backward = self.pass(
            ctx,
            state,
            rng,
            Side::Target,
            ctx.config.reverse_link_probability,
        );
        forward + backward
    }

    fn name(&self) -> &'static str {
        "unaligned"
    }
}
