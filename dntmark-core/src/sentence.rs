//! Mutable per-pair view of a tagged sentence
//!
//! Positions are never removed. Collapsing a span overwrites its head slot
//! and marks the remaining slots `Skipped`, so every index recorded
//! elsewhere (alignment links, saved entity spans) stays valid until the
//! sentence is rebuilt.

use crate::alignment::{AlignmentRelation, Links};
use crate::sampler::Placeholder;
use crate::tags::{Tag, Token};

/// Which side of the pair a sentence belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Source language
    Source,
    /// Target language
    Target,
}

impl Side {
    /// The other side
    pub fn opposite(self) -> Self {
        match self {
            Side::Source => Side::Target,
            Side::Target => Side::Source,
        }
    }
}

/// Liveness of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Emitted at rebuild
    Active,
    /// Absorbed into a collapsed span head
    Skipped,
}

/// One position of a working sentence
#[derive(Debug, Clone)]
pub struct Slot {
    /// Current surface form
    pub word: String,
    /// Current tag; `Tag::Entity` once the slot holds a placeholder
    pub tag: Tag,
    /// Tag assigned by the tagger, never rewritten
    pub original_tag: Tag,
    /// Linked positions on the other side
    pub links: Links,
    /// Liveness
    pub state: SlotState,
    /// Placeholder held by this slot, if any
    pub placeholder: Option<Placeholder>,
}

/// Fixed-size slot buffer derived once per sentence per pair
#[derive(Debug, Clone)]
pub struct WorkingSentence {
    side: Side,
    slots: Vec<Slot>,
}

impl WorkingSentence {
    /// Build without alignment links
    pub fn new(tokens: &[Token], side: Side) -> Self {
        Self::build(tokens, side, |_| Links::new())
    }

    /// Build with each slot's links taken from `relation`
    pub fn with_alignment(tokens: &[Token], side: Side, relation: &AlignmentRelation) -> Self {
        Self::build(tokens, side, |i| match side {
            Side::Source => relation.targets_of(i),
            Side::Target => relation.sources_of(i),
        })
    }

    fn build(tokens: &[Token], side: Side, links: impl Fn(usize) -> Links) -> Self {
        let slots = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| Slot {
                word: token.word.clone(),
                tag: token.tag.clone(),
                original_tag: token.tag.clone(),
                links: links(i),
                state: SlotState::Active,
                placeholder: None,
            })
            .collect();
        Self { side, slots }
    }

    /// Side of the pair
    pub fn side(&self) -> Side {
        self.side
    }

    /// Number of positions, including skipped ones
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the sentence has no positions
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot at `index`
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// All slots in position order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Current word at `index`
    pub fn word(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(|s| s.word.as_str())
    }

    /// Whether `index` is active and not yet turned into a placeholder
    pub fn is_available(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .is_some_and(|s| s.state == SlotState::Active && s.placeholder.is_none())
    }

    /// Whether every index in `indices` is available
    pub fn all_available(&self, indices: &[usize]) -> bool {
        !indices.is_empty() && indices.iter().all(|&i| self.is_available(i))
    }

    /// Collapse a span onto its head and hand it `placeholder`
    ///
    /// The head keeps its position and receives the marker; trailing
    /// positions are marked `Skipped`.
    pub fn collapse(&mut self, indices: &[usize], placeholder: Placeholder) {
        let Some((&head, rest)) = indices.split_first() else {
            return;
        };
        debug_assert!(self.all_available(indices));

        let slot = &mut self.slots[head];
        slot.word = placeholder.marker();
        slot.tag = Tag::Entity;
        slot.placeholder = Some(placeholder);

        for &i in rest {
            self.slots[i].state = SlotState::Skipped;
        }
    }

    /// Words of active positions, in order
    pub fn active_words(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(|s| s.state == SlotState::Active)
            .map(|s| s.word.as_str())
    }

    /// Indices of positions marked `Skipped`
    pub fn skipped(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.state == SlotState::Skipped)
            .map(|(i, _)| i)
            .collect()
    }

    /// Placeholders held by active positions
    pub fn placeholders(&self) -> Vec<Placeholder> {
        self.slots
            .iter()
            .filter(|s| s.state == SlotState::Active)
            .filter_map(|s| s.placeholder)
            .collect()
    }
}
