//! Entity span extraction from BIO-tagged sentences

use crate::lexical::{is_alnum, normalize, StopWords};
use crate::tags::{TagSet, Token};
use smallvec::SmallVec;

/// Ordered token positions of one span
pub type SpanIndices = SmallVec<[usize; 4]>;

/// A maximal `B-` run followed by any number of `I-` tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    /// Class of the opening `B-` tag
    pub class: String,
    /// Positions covered, ascending and contiguous
    pub indices: SpanIndices,
    /// Space-joined surface text
    pub surface: String,
}

impl EntitySpan {
    /// Number of tokens in the span
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the span covers no token
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// First position of the span
    pub fn head(&self) -> usize {
        self.indices[0]
    }

    /// Words of the span, in order
    pub fn words<'a>(&self, tokens: &'a [Token]) -> Vec<&'a str> {
        self.indices.iter().map(|&i| tokens[i].word.as_str()).collect()
    }
}

/// Scan `tokens` left to right and return every admitted entity span
///
/// Any `I-` tag continues the open span, whatever its class. A `B-` tag
/// with a class outside the admitted set is treated as non-entity.
pub fn extract_spans(tokens: &[Token], tags: &TagSet) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut idx = 0;

    while idx < tokens.len() {
        let class = match tokens[idx].tag.class() {
            Some(class) if tokens[idx].tag.is_begin() && tags.is_admitted(class) => class,
            _ => {
                idx += 1;
                continue;
            }
        };

        let mut indices = SpanIndices::new();
        indices.push(idx);
        let mut j = idx + 1;
        while j < tokens.len() && tokens[j].tag.is_inside() {
            indices.push(j);
            j += 1;
        }

        let surface = indices
            .iter()
            .map(|&i| tokens[i].word.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        spans.push(EntitySpan {
            class: class.to_string(),
            indices,
            surface,
        });
        idx = j;
    }

    spans
}

/// All occurrences of one entity surface within a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityGroup {
    /// Surface text with surrounding apostrophes removed
    pub surface: String,
    /// Class of the first occurrence
    pub class: String,
    /// Normalized words of the surface
    pub normalized: Vec<String>,
    /// Spans carrying this surface, in order of appearance
    pub occurrences: Vec<SpanIndices>,
}

/// Group spans by surface text for subsequence matching
///
/// Single non-alphanumeric characters and stopwords are dropped. Groups
/// keep the order in which their surface first appears.
pub fn group_entities(tokens: &[Token], tags: &TagSet, stops: &StopWords) -> Vec<EntityGroup> {
    let mut groups: Vec<EntityGroup> = Vec::new();

    for span in extract_spans(tokens, tags) {
        let surface = span.surface.trim_matches('\'');
        let keep = match surface.chars().count() {
            0 => false,
            1 => is_alnum(surface),
            _ => true,
        };
        if !keep || stops.contains(surface) {
            continue;
        }

        match groups.iter_mut().find(|g| g.surface == surface) {
            Some(group) => group.occurrences.push(span.indices),
            None => groups.push(EntityGroup {
                surface: surface.to_string(),
                class: span.class.clone(),
                normalized: normalize(surface)
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
                occurrences: vec![span.indices],
            }),
        }
    }

    groups
}
