//! Alignment-based linking
//!
//! A source span is mapped onto the target through the alignment links of
//! its first token. Multi-token spans grow forward from the smallest linked
//! target position; single tokens pick the closest aligned word.

use super::{
    accept, class_label, join_words, span_of, Correspondence, EntityLinker, LinkContext, LinkKind,
    PairState, Rejection,
};
use crate::config::{SingleTokenPolicy, SpanGrowth};
use crate::extract::{extract_spans, EntitySpan, SpanIndices};
use crate::lexical::{classify_type, distance, is_alnum, normalize};
use crate::sampler::contains_marker;
use rand::RngCore;

/// Follows a precomputed word alignment from source spans to target spans
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignedLinker;

impl AlignedLinker {
    /// Create the linker
    pub fn new() -> Self {
        Self
    }

    fn link_span(
        &self,
        ctx: &LinkContext<'_>,
        state: &mut PairState<'_>,
        span: &EntitySpan,
    ) -> Result<(), Rejection> {
        if !state.source.all_available(&span.indices) {
            return Err(Rejection::AlreadyConsumed);
        }

        let anchor = state
            .source
            .slot(span.head())
            .and_then(|slot| slot.links.first().copied())
            .ok_or(Rejection::NoLink)?;
        if !state.target.is_available(anchor) {
            return Err(Rejection::AnchorUnavailable);
        }

        let target_tokens = state.target_tokens;
        let anchor_class = target_tokens[anchor].tag.class();
        if !ctx
            .tags
            .classes_compatible(ctx.config.class_policy, &span.class, anchor_class)
        {
            return Err(Rejection::ClassMismatch);
        }

        let source_words = span.words(state.source_tokens);
        let mut grown = span_of(anchor);
        let mut next = anchor + 1;
        while grown.len() < span.len() && state.target.is_available(next) {
            let continues = target_tokens[next].tag.is_inside()
                || match ctx.config.growth {
                    SpanGrowth::TagContinuation => false,
                    SpanGrowth::TagOrSimilarity { max_distance } => {
                        let previous = normalize(&target_tokens[next - 1].word);
                        let counterpart = normalize(source_words[grown.len() - 1]);
                        distance(&previous, &counterpart) < max_distance
                    }
                };
            if !continues {
                break;
            }
            grown.push(next);
            next += 1;
        }

        let source_text = span.surface.clone();
        let target_text = join_words(target_tokens, &grown);
        check_guards(&source_text, &target_text, span.len(), grown.len(), ctx)?;

        let source_class = span.class.clone();
        let target_class = class_label(target_tokens, anchor);
        state.substitute(&span.indices, &grown, |placeholder| Correspondence {
            kind: LinkKind::AlignedSpan,
            placeholder: placeholder.id(),
            source_class,
            source_text,
            target_class,
            target_text,
        })?;
        Ok(())
    }

    fn link_token(
        &self,
        ctx: &LinkContext<'_>,
        state: &mut PairState<'_>,
        span: &EntitySpan,
    ) -> Result<(), Rejection> {
        let head = span.head();
        if !state.source.is_available(head) {
            return Err(Rejection::AlreadyConsumed);
        }

        let source_tokens = state.source_tokens;
        let source_word = &source_tokens[head].word;
        if source_word.chars().count() < 2 {
            return Err(Rejection::Implausible);
        }

        let links = state
            .source
            .slot(head)
            .map(|slot| slot.links.clone())
            .unwrap_or_default();
        if links.is_empty() {
            return Err(Rejection::NoLink);
        }

        let target_tokens = state.target_tokens;
        let folded = normalize(source_word);
        let mut best: Option<(usize, usize)> = None;

        for link in links {
            if !state.target.is_available(link) {
                continue;
            }
            let candidate = &target_tokens[link];
            let eligible = !contains_marker(&candidate.word) && is_alnum(&candidate.word);

            match ctx.config.single_token {
                SingleTokenPolicy::FirstLink => {
                    if eligible {
                        best = Some((0, link));
                    }
                    break;
                }
                SingleTokenPolicy::Closest { max_distance } => {
                    let d = distance(&folded, &normalize(&candidate.word));
                    let same_class = candidate.tag.class() == Some(span.class.as_str());
                    if eligible
                        && (same_class || d < max_distance)
                        && best.map_or(true, |(best_d, _)| d < best_d)
                    {
                        best = Some((d, link));
                    }
                }
            }
        }

        let (_, link) = best.ok_or(Rejection::NoCandidate)?;
        let source_class = span.class.clone();
        let source_text = source_word.clone();
        let target_class = class_label(target_tokens, link);
        let target_text = target_tokens[link].word.clone();
        let target: SpanIndices = span_of(link);
        state.substitute(&span.indices, &target, |placeholder| Correspondence {
            kind: LinkKind::AlignedToken,
            placeholder: placeholder.id(),
            source_class,
            source_text,
            target_class,
            target_text,
        })?;
        Ok(())
    }
}

/// Plausibility guards shared by every multi-token correspondence
fn check_guards(
    source_text: &str,
    target_text: &str,
    source_len: usize,
    target_len: usize,
    ctx: &LinkContext<'_>,
) -> Result<(), Rejection> {
    if target_text.chars().count() == 1 && !is_alnum(target_text) {
        return Err(Rejection::SingleSymbol);
    }

    let ratio = ctx.config.max_span_ratio;
    if source_len >= ratio * target_len || target_len >= ratio * source_len {
        return Err(Rejection::SpanRatio);
    }

    if classify_type(source_text) != classify_type(target_text) {
        return Err(Rejection::TypeMismatch);
    }

    Ok(())
}

impl EntityLinker for AlignedLinker {
    fn run(
        &self,
        ctx: &LinkContext<'_>,
        state: &mut PairState<'_>,
        rng: &mut dyn RngCore,
    ) -> usize {
        let mut accepted = 0;

        for span in extract_spans(state.source_tokens, ctx.tags) {
            let outcome = if !accept(rng, ctx.config.link_probability) {
                Err(Rejection::SampledOut)
            } else if span.len() > 1 {
                self.link_span(ctx, state, &span)
            } else {
                self.link_token(ctx, state, &span)
            };

            match outcome {
                Ok(()) => accepted += 1,
                Err(reason) => log::debug!(
                    "{}: skipped [{}][{}]: {reason}",
                    self.name(),
                    span.class,
                    span.surface
                ),
            }
        }

        accepted
    }

    fn name(&self) -> &'static str {
        "aligned"
    }
}
