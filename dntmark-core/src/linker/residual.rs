//! Residual single-token linking
//!
//! Runs after the primary linker and catches lexically identical words the
//! tagger missed on one side.

use super::{
    accept, class_label, span_of, Correspondence, EntityLinker, LinkContext, LinkKind, PairState,
    Rejection,
};
use crate::lexical::normalize;
use rand::RngCore;

/// Lower-confidence pass over the remaining source tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct ResidualLinker;

impl ResidualLinker {
    /// Create the linker
    pub fn new() -> Self {
        Self
    }

    fn link_token(
        &self,
        ctx: &LinkContext<'_>,
        state: &mut PairState<'_>,
        index: usize,
    ) -> Result<(), Rejection> {
        let source_tokens = state.source_tokens;
        let target_tokens = state.target_tokens;
        let folded = normalize(&source_tokens[index].word);
        if !ctx.stops.is_plausible(&folded) {
            return Err(Rejection::Implausible);
        }

        let target = (0..target_tokens.len())
            .find(|&j| state.target.is_available(j) && normalize(&target_tokens[j].word) == folded)
            .ok_or(Rejection::NoMatch)?;

        let tagged = ctx.tags.admits(&source_tokens[index].tag)
            || ctx.tags.admits(&target_tokens[target].tag);
        let aligned = state
            .source
            .slot(index)
            .is_some_and(|slot| slot.links.contains(&target));
        if !(tagged || aligned) {
            return Err(Rejection::ClassMismatch);
        }

        let source_class = class_label(source_tokens, index);
        let source_text = source_tokens[index].word.clone();
        let target_class = class_label(target_tokens, target);
        let target_text = target_tokens[target].word.clone();
        state.substitute(&span_of(index), &span_of(target), |placeholder| Correspondence {
            kind: LinkKind::Residual,
            placeholder: placeholder.id(),
            source_class,
            source_text,
            target_class,
            target_text,
        })?;
        Ok(())
    }
}

impl EntityLinker for ResidualLinker {
    fn run(
        &self,
        ctx: &LinkContext<'_>,
        state: &mut PairState<'_>,
        rng: &mut dyn RngCore,
    ) -> usize {
        let mut accepted = 0;

        for index in 0..state.source.len() {
            if !state.source.is_available(index) {
                continue;
            }
            // One draw per remaining token, taken before any check
            if !accept(rng, ctx.config.residual_probability) {
                continue;
            }
            match self.link_token(ctx, state, index) {
                Ok(()) => accepted += 1,
                Err(Rejection::Implausible) => {}
                Err(reason) => log::debug!(
                    "{}: skipped [{}]: {reason}",
                    self.name(),
                    state.source_tokens[index].word
                ),
            }
        }

        accepted
    }

    fn name(&self) -> &'static str {
        "residual"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignmentRelation;
    use crate::config::EngineConfig;
    use crate::linker::test_support::{state, stops, tag_set};
    use crate::sampler::Placeholder;
    use crate::tags::{sentence, Token};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn link(source: &[Token], target: &[Token], alignment: Option<&str>) -> (usize, Vec<String>, Vec<String>) {
        let relation = alignment.map(|line| AlignmentRelation::parse(line).unwrap());
        let tags = tag_set();
        let stops = stops();
        let config = EngineConfig::builder().residual_probability(1.0).build().unwrap();
        let ctx = LinkContext {
            config: &config,
            tags: &tags,
            stops: &stops,
        };
        let mut pair = state(source, target, relation.as_ref(), vec![6, 5]);
        let mut rng = StdRng::seed_from_u64(5);
        let accepted = ResidualLinker::new().run(&ctx, &mut pair, &mut rng);
        (
            accepted,
            pair.source.active_words().map(str::to_string).collect(),
            pair.target.active_words().map(str::to_string).collect(),
        )
    }

    #[test]
    fn test_links_word_tagged_on_one_side() {
        let source = sentence([("Ferrari", "O"), ("wins", "O")]);
        let target = sentence([("vince", "O"), ("la", "O"), ("ferrari", "B-ORG")]);

        let (accepted, src, trg) = link(&source, &target, None);
        assert_eq!(accepted, 1);
        assert_eq!(src, vec!["${DNT0}5", "wins"]);
        assert_eq!(trg, vec!["vince", "la", "${DNT0}5"]);
    }

    #[test]
    fn test_untagged_words_need_alignment() {
        let source = sentence([("Tokyo", "O"), ("today", "O")]);
        let target = sentence([("Tokyo", "O"), ("oggi", "O")]);

        let (accepted, ..) = link(&source, &target, None);
        assert_eq!(accepted, 0);

        let (accepted, src, _) = link(&source, &target, Some("0-0 1-1"));
        assert_eq!(accepted, 1);
        assert_eq!(src, vec!["${DNT0}5", "today"]);
    }

    #[test]
    fn test_stopwords_and_short_words_skipped() {
        let source = sentence([("the", "B-LOC"), ("x", "B-LOC"), ("-", "B-LOC")]);
        let target = sentence([("the", "B-LOC"), ("x", "B-LOC"), ("-", "B-LOC")]);

        let (accepted, ..) = link(&source, &target, None);
        assert_eq!(accepted, 0);
    }

    #[test]
    fn test_consumed_slots_are_left_alone() {
        let source = sentence([("Parigi", "B-LOC")]);
        let target = sentence([("Parigi", "B-LOC")]);
        let tags = tag_set();
        let stops = stops();
        let config = EngineConfig::builder().residual_probability(1.0).build().unwrap();
        let ctx = LinkContext {
            config: &config,
            tags: &tags,
            stops: &stops,
        };
        let mut pair = state(&source, &target, None, vec![1]);
        pair.source.collapse(&[0], Placeholder(9));

        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(ResidualLinker::new().run(&ctx, &mut pair, &mut rng), 0);
        assert_eq!(pair.sampler.remaining(), 1);
    }
}
