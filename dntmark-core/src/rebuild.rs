//! Sentence reconstruction and punctuation re-gluing
//!
//! Tokenizers split punctuation, numbers and quotes away from their words.
//! After a sentence is rebuilt from its active slots, a fixed sequence of
//! string rewrites closes those gaps again:
//!
//! 1. trailing punctuation `.,:%;!?)]` sticks to the preceding word
//! 2. hyphens stick to both neighbours
//! 3. opening brackets stick to the following word
//! 4. split numerals such as `12 . 5` are closed up
//! 5. quote pairs lose their inner padding
//! 6. runs of one repeated ASCII symbol are merged
//! 7. a period joins a following `,;:`
//! 8. single-letter abbreviations (`U. K.`) are joined
//! 9. a period joins a following 2-3 letter lowercase word (`example. com`)
//!
//! The sequence is repeated until the text stops changing, so normalizing
//! already normalized text is a no-op.

use crate::config::EngineConfig;
use crate::sentence::WorkingSentence;
use regex::{Captures, Regex};
use std::sync::OnceLock;

const MAX_PASSES: usize = 8;

struct Patterns {
    trailing: Regex,
    hyphen: Regex,
    open_paren: Regex,
    open_bracket: Regex,
    numeral: Regex,
    period_clause: Regex,
    initials: Regex,
    suffix: Regex,
    diacritic: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("rebuild pattern is valid");
        Patterns {
            trailing: compile(r"\s*([.,:%;!?\])])\s*"),
            hyphen: compile(r"\s*-\s*"),
            open_paren: compile(r"\(\s*"),
            open_bracket: compile(r"\[\s*"),
            numeral: compile(r"\d+(?:[.,]\s*\d+)+"),
            period_clause: compile(r"\. ([,;:])"),
            initials: compile(r"([A-Z]\.) ([A-Z]\.)"),
            suffix: compile(r"\. ([a-z]{2,3})\b"),
            diacritic: compile(r"(\w)\s+([\x{064B}-\x{0652}])\s+(\w)"),
        }
    })
}

/// Rebuilds the surface text of a working sentence
#[derive(Debug, Clone, Copy)]
pub struct Rebuilder {
    punctuation: bool,
    diacritics: bool,
}

impl Rebuilder {
    /// Create a rebuilder with explicit switches
    pub fn new(punctuation: bool, diacritics: bool) -> Self {
        Self {
            punctuation,
            diacritics,
        }
    }

    /// Create a rebuilder following the engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.normalize_punctuation, config.rejoin_diacritics)
    }

    /// Join active slots with single spaces, then normalize
    pub fn rebuild(&self, sentence: &WorkingSentence) -> String {
        let joined = sentence.active_words().collect::<Vec<_>>().join(" ");
        self.normalize(&joined)
    }

    /// Apply the enabled rewrites until the text is stable
    pub fn normalize(&self, text: &str) -> String {
        if !self.punctuation && !self.diacritics {
            return text.to_string();
        }

        let mut current = text.to_string();
        for _ in 0..MAX_PASSES {
            let mut next = current.clone();
            if self.punctuation {
                next = normalize_punctuation_once(&next);
            }
            if self.diacritics {
                next = rejoin_diacritics_once(&next);
            }
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

impl Default for Rebuilder {
    fn default() -> Self {
        Self::new(true, false)
    }
}

/// Re-glue punctuation split off by tokenization
pub fn normalize_punctuation(text: &str) -> String {
    Rebuilder::default().normalize(text)
}

fn normalize_punctuation_once(text: &str) -> String {
    let p = patterns();

    let text = p.trailing.replace_all(text, "$1 ");
    let text = p.hyphen.replace_all(&text, "-");
    let text = p.open_paren.replace_all(&text, "(");
    let text = p.open_bracket.replace_all(&text, "[");
    let text = p.numeral.replace_all(&text, |caps: &Captures| {
        caps[0].split_whitespace().collect::<String>()
    });
    let text = tighten_quotes(&text);
    let text = merge_repeated_symbols(&text);
    let text = p.period_clause.replace_all(&text, ".$1");

    let mut text = text.into_owned();
    loop {
        let joined = p.initials.replace_all(&text, "$1$2").into_owned();
        if joined == text {
            break;
        }
        text = joined;
    }

    let text = p.suffix.replace_all(&text, ".$1");
    text.trim().to_string()
}

fn rejoin_diacritics_once(text: &str) -> String {
    patterns()
        .diacritic
        .replace_all(text, "$1$2$3")
        .into_owned()
}

/// Remove padding just inside each left-to-right pair of `"`
///
/// An unpaired trailing quote is left alone.
fn tighten_quotes(text: &str) -> String {
    let paired = text.matches('"').count() / 2 * 2;
    let mut out = String::with_capacity(text.len());
    let mut seen = 0;
    let mut skip_space = false;

    for ch in text.chars() {
        if ch == '"' && seen < paired {
            if seen % 2 == 0 {
                skip_space = true;
            } else {
                let trimmed = out.trim_end().len();
                out.truncate(trimmed);
                skip_space = false;
            }
            seen += 1;
            out.push(ch);
            continue;
        }
        if skip_space && ch.is_whitespace() {
            continue;
        }
        skip_space = false;
        out.push(ch);
    }

    out
}

fn is_mergeable_symbol(ch: char) -> bool {
    ch.is_ascii() && !ch.is_ascii_alphanumeric() && !ch.is_ascii_whitespace()
}

/// Merge `! ! !` style runs of one ASCII symbol into `!!!`
fn merge_repeated_symbols(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        out.push(ch);
        i += 1;
        if !is_mergeable_symbol(ch) {
            continue;
        }
        loop {
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j > i && j < chars.len() && chars[j] == ch {
                out.push(ch);
                i = j + 1;
            } else {
                break;
            }
        }
    }

    out
}
