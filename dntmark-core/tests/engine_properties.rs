//! End-to-end properties of the substitution engine

use dntmark_core::config::default_tag_config;
use dntmark_core::extract::extract_spans;
use dntmark_core::lexical::distance;
use dntmark_core::linker::{AlignedLinker, EntityLinker, LinkContext, PairState};
use dntmark_core::sampler::PlaceholderSampler;
use dntmark_core::sentence::{Side, SlotState, WorkingSentence};
use dntmark_core::{
    normalize_punctuation, scan_markers, sentence, AlignmentRelation, EngineConfig,
    LinkingStrategy, PairProcessor, PairStatus, Tag,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

#[test]
fn extractor_yields_person_and_location() {
    let tokens = sentence([
        ("Yesterday", "O"),
        ("Anna", "B-PERSON"),
        ("Bianchi", "I-PERSON"),
        ("visited", "O"),
        ("Turin", "B-LOC"),
    ]);
    let spans = extract_spans(&tokens, &default_tag_config().tag_set());

    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].class, "PERSON");
    assert_eq!(spans[0].indices.as_slice(), &[1, 2]);
    assert_eq!(spans[1].class, "LOC");
    assert_eq!(spans[1].indices.as_slice(), &[4]);
}

#[test]
fn edit_distance_reference_value() {
    assert_eq!(distance("kitten", "sitting"), 3);
}

#[test]
fn aligned_span_grows_and_soft_deletes() {
    let source = sentence([
        ("New", "B-LOC"),
        ("York", "I-LOC"),
        ("never", "O"),
        ("sleeps", "O"),
    ]);
    let target = sentence([
        ("La", "O"),
        ("città", "O"),
        ("di", "O"),
        ("notte", "O"),
        (":", "O"),
        ("New", "B-LOC"),
        ("York", "I-LOC"),
        ("non", "O"),
        ("dorme", "O"),
    ]);
    let relation = AlignmentRelation::parse("0-5 2-7 3-8").unwrap();

    let tag_config = default_tag_config();
    let tags = tag_config.tag_set();
    let stops = tag_config.stop_words();
    let config = EngineConfig::default();
    let ctx = LinkContext {
        config: &config,
        tags: &tags,
        stops: &stops,
    };
    let mut state = PairState {
        source_tokens: &source,
        target_tokens: &target,
        source: WorkingSentence::with_alignment(&source, Side::Source, &relation),
        target: WorkingSentence::with_alignment(&target, Side::Target, &relation),
        sampler: PlaceholderSampler::from_pool(vec![12]),
        correspondences: Vec::new(),
    };
    let mut rng = StdRng::seed_from_u64(0);

    assert_eq!(AlignedLinker::new().run(&ctx, &mut state, &mut rng), 1);

    assert_eq!(state.source.len(), source.len());
    assert_eq!(state.target.len(), target.len());
    assert_eq!(state.source.word(0), Some("${DNT0}12"));
    assert_eq!(state.target.word(5), Some("${DNT0}12"));
    assert_eq!(state.source.slot(0).unwrap().tag, Tag::Entity);
    assert_eq!(state.target.slot(5).unwrap().tag, Tag::Entity);
    assert_eq!(state.source.slot(1).unwrap().state, SlotState::Skipped);
    assert_eq!(state.target.slot(6).unwrap().state, SlotState::Skipped);
    assert_eq!(state.source.skipped(), vec![1]);
    assert_eq!(state.target.skipped(), vec![6]);
}

#[test]
fn alignment_free_round_trip_places_marker_identically() {
    let tokens = sentence([
        ("The", "O"),
        ("museum", "O"),
        ("in", "O"),
        ("Florence", "B-GPE"),
        ("reopened", "O"),
        ("yesterday", "O"),
        (".", "O"),
    ]);
    let config = EngineConfig::builder()
        .strategy(LinkingStrategy::AlignmentFree)
        .residual_pass(false)
        .seed(2024)
        .build()
        .unwrap();
    let processor = PairProcessor::new(config, default_tag_config()).unwrap();
    let outcome = processor.process(0, &tokens, &tokens, None);

    assert_eq!(outcome.status, PairStatus::Substituted);
    assert_eq!(outcome.source, outcome.target);
    let words: Vec<&str> = outcome.source.split_whitespace().collect();
    assert!(words[3].starts_with("${DNT0}"));
}

#[test]
fn pair_without_content_words_is_always_discarded() {
    let tagged = sentence([("Paris", "B-GPE"), ("!", "O")]);
    let relation = AlignmentRelation::parse("0-0 1-1").unwrap();
    let processor = PairProcessor::new(
        EngineConfig::builder().seed(1).build().unwrap(),
        default_tag_config(),
    )
    .unwrap();
    let outcome = processor.process(0, &tagged, &tagged, Some(&relation));
    assert_eq!(outcome.status, PairStatus::Discarded);
    assert_eq!(outcome.source, "Paris !");

    let untagged = sentence([("?", "O"), ("!", "O")]);
    let outcome = processor.process(1, &untagged, &untagged, None);
    assert_eq!(outcome.status, PairStatus::Discarded);
}

#[test]
fn placeholders_unique_and_mirrored() {
    let source = sentence([
        ("Talks", "O"),
        ("between", "O"),
        ("Rome", "B-GPE"),
        (",", "O"),
        ("Paris", "B-GPE"),
        ("and", "O"),
        ("Berlin", "B-GPE"),
        ("opened", "O"),
        ("with", "O"),
        ("Angela", "B-PERSON"),
        ("Merkel", "I-PERSON"),
        ("speaking", "O"),
        ("first", "O"),
        ("about", "O"),
        ("budgets", "O"),
        ("and", "O"),
        ("trade", "O"),
        ("today", "O"),
    ]);
    let target = sentence([
        ("Colloqui", "O"),
        ("tra", "O"),
        ("Roma", "B-GPE"),
        (",", "O"),
        ("Parigi", "B-GPE"),
        ("e", "O"),
        ("Berlino", "B-GPE"),
        ("aperti", "O"),
        ("con", "O"),
        ("Angela", "B-PERSON"),
        ("Merkel", "I-PERSON"),
        ("che", "O"),
        ("parla", "O"),
        ("prima", "O"),
        ("di", "O"),
        ("bilanci", "O"),
        ("e", "O"),
        ("commercio", "O"),
        ("oggi", "O"),
    ]);
    let relation = AlignmentRelation::parse(
        "0-0 1-1 2-2 3-3 4-4 5-5 6-6 7-7 8-8 9-9 10-10 11-12 12-13 14-15 15-16 16-17 17-18",
    )
    .unwrap();

    for seed in 0..20 {
        let processor = PairProcessor::new(
            EngineConfig::builder().seed(seed).build().unwrap(),
            default_tag_config(),
        )
        .unwrap();
        let outcome = processor.process(seed as usize, &source, &target, Some(&relation));
        assert_eq!(outcome.status, PairStatus::Substituted);

        let source_ids = scan_markers(&outcome.source);
        let target_ids = scan_markers(&outcome.target);
        let unique: HashSet<_> = source_ids.iter().collect();
        assert_eq!(unique.len(), source_ids.len(), "repeated id in {}", outcome.source);

        let mut sorted_source = source_ids.clone();
        let mut sorted_target = target_ids.clone();
        sorted_source.sort();
        sorted_target.sort();
        assert_eq!(sorted_source, sorted_target);
        assert_eq!(source_ids.len(), outcome.correspondences.len());
    }
}

proptest! {
    #[test]
    fn distance_is_a_metric(a in "[a-e]{0,8}", b in "[a-e]{0,8}", c in "[a-e]{0,8}") {
        prop_assert_eq!(distance(&a, &a), 0);
        prop_assert_eq!(distance(&a, &b), distance(&b, &a));
        prop_assert!(distance(&a, &c) <= distance(&a, &b) + distance(&b, &c));
        prop_assert!(distance(&a, &b) <= a.len().max(b.len()));
    }

    #[test]
    fn punctuation_normalization_is_idempotent(
        words in prop::collection::vec(
            prop::sample::select(vec![
                "word", "Milan", "U", "S", "42", "7", ".", ",", ";", "!", "?", ")", "(", "-",
                "\"", "%", "org", "${DNT0}9",
            ]),
            0..16,
        )
    ) {
        let once = normalize_punctuation(&words.join(" "));
        prop_assert_eq!(normalize_punctuation(&once), once.clone());
    }
}
