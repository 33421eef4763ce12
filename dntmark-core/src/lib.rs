//! Entity correspondence and do-not-translate placeholder substitution
//!
//! Given a tagged source sentence, a tagged target sentence and optionally a
//! word alignment between them, the engine finds entity spans that denote
//! the same thing on both sides, checks each correspondence against a set of
//! plausibility guards, and replaces both spans with one shared marker of
//! the form `${DNT0}<id>`. A translation model trained on the result learns
//! to copy such spans instead of translating them.
//!
//! # Architecture
//!
//! Per sentence pair the data flows through:
//!
//! - [`extract`]: BIO spans of admitted classes
//! - [`linker`]: alignment-based or alignment-free linking, then an optional
//!   residual single-token pass, all drawing identifiers from a
//!   [`sampler::PlaceholderSampler`]
//! - [`rebuild`]: sentence reconstruction and punctuation re-gluing
//! - [`gate`]: the density gate and optional marker duplication
//!
//! [`pipeline::PairProcessor`] wires these together; [`corpus`] reads the
//! index-synchronised input streams and [`stats`] checks the outputs.
//!
//! # Example
//!
//! ```rust
//! use dntmark_core::{default_tag_config, sentence, AlignmentRelation, EngineConfig, PairProcessor};
//!
//! let config = EngineConfig::builder().seed(7).build().unwrap();
//! let processor = PairProcessor::new(config, default_tag_config()).unwrap();
//!
//! let source = sentence([("I", "O"), ("love", "O"), ("Rome", "B-GPE"), ("today", "O")]);
//! let target = sentence([("Amo", "O"), ("Roma", "B-GPE"), ("oggi", "O")]);
//! let alignment = AlignmentRelation::parse("1-0 2-1 3-2").unwrap();
//!
//! let outcome = processor.process(0, &source, &target, Some(&alignment));
//! assert!(outcome.source.contains("${DNT0}"));
//! assert_eq!(
//!     dntmark_core::scan_markers(&outcome.source),
//!     dntmark_core::scan_markers(&outcome.target)
//! );
//! ```

pub mod alignment;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod gate;
pub mod lexical;
pub mod linker;
pub mod pipeline;
pub mod rebuild;
pub mod sampler;
pub mod sentence;
pub mod stats;
pub mod tags;

pub use alignment::AlignmentRelation;
pub use config::{
    default_tag_config, EngineConfig, EngineConfigBuilder, LinkingStrategy, SingleTokenPolicy,
    SpanGrowth, TagConfig,
};
pub use corpus::{CorpusReader, PairRecord};
pub use error::{CoreError, Result};
pub use linker::{Correspondence, LinkKind};
pub use pipeline::{PairOutcome, PairProcessor, PairStatus};
pub use rebuild::normalize_punctuation;
pub use sampler::{scan_markers, Placeholder};
pub use stats::{PlaceholderCounts, RunSummary};
pub use tags::{sentence, ClassPolicy, Tag, TagSet, Token};
