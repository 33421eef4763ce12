//! Parallel corpus streams
//!
//! A corpus is a set of line-oriented streams that must stay in lockstep:
//! tagged source, tagged target, and optionally an alignment stream and the
//! two untokenized original texts. Record `i` of every stream describes the
//! same sentence pair.

use crate::error::{CoreError, Result};
use crate::tags::Token;
use std::io::{BufRead, Lines};

/// Decode one tagged JSON Lines record: an array of `[word, tag]` pairs
///
/// A blank line is an empty sentence.
pub fn decode_tagged_line(line: &str, record: usize) -> Result<Vec<Token>> {
    if line.trim().is_empty() {
        return Ok(Vec::new());
    }
    let pairs: Vec<(String, String)> =
        serde_json::from_str(line).map_err(|e| CoreError::MalformedRecord {
            record,
            reason: e.to_string(),
        })?;
    Ok(pairs
        .into_iter()
        .map(|(word, tag)| Token::new(word, &tag))
        .collect())
}

/// Encode a sentence as a tagged JSON Lines record
pub fn encode_tagged_line(tokens: &[Token]) -> String {
    let pairs: Vec<(&str, String)> = tokens
        .iter()
        .map(|t| (t.word.as_str(), t.tag.to_string()))
        .collect();
    // Serializing strings cannot fail
    serde_json::to_string(&pairs).unwrap_or_default()
}

/// Aligner input line: `source words ||| target words`
pub fn merge_line(source: &[Token], target: &[Token]) -> String {
    let join = |tokens: &[Token]| {
        tokens
            .iter()
            .map(|t| t.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!("{} ||| {}", join(source), join(target))
}

/// One index-synchronised record of the corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRecord {
    /// Zero-based record index
    pub index: usize,
    /// Tagged source sentence
    pub source: Vec<Token>,
    /// Tagged target sentence
    pub target: Vec<Token>,
    /// Raw alignment line, when an alignment stream is present
    pub alignment: Option<String>,
    /// Untokenized source and target text, when supplied
    pub originals: Option<(String, String)>,
}

/// Reads the corpus streams in lockstep
///
/// Any stream ending before the others yields
/// [`CoreError::StreamMismatch`] and stops iteration.
pub struct CorpusReader<R: BufRead> {
    source: Lines<R>,
    target: Lines<R>,
    alignment: Option<Lines<R>>,
    originals: Option<(Lines<R>, Lines<R>)>,
    index: usize,
    finished: bool,
}

impl<R: BufRead> CorpusReader<R> {
    /// Read tagged source and target streams
    pub fn new(source: R, target: R) -> Self {
        Self {
            source: source.lines(),
            target: target.lines(),
            alignment: None,
            originals: None,
            index: 0,
            finished: false,
        }
    }

    /// Add an alignment stream
    pub fn with_alignment(mut self, alignment: R) -> Self {
        self.alignment = Some(alignment.lines());
        self
    }

    /// Add the untokenized original texts
    pub fn with_originals(mut self, source: R, target: R) -> Self {
        self.originals = Some((source.lines(), target.lines()));
        self
    }

    /// Number of records yielded so far
    pub fn position(&self) -> usize {
        self.index
    }

    fn mismatch(&mut self, stream: &str) -> Option<Result<PairRecord>> {
        self.finished = true;
        Some(Err(CoreError::StreamMismatch {
            record: self.index,
            stream: stream.to_string(),
        }))
    }

    fn fail(&mut self, error: CoreError) -> Option<Result<PairRecord>> {
        self.finished = true;
        Some(Err(error))
    }

    /// Streams other than the source, each paired with its next line
    fn next_companions(&mut self) -> Vec<(&'static str, Option<std::io::Result<String>>)> {
        let mut next = vec![("target", self.target.next())];
        if let Some(alignment) = self.alignment.as_mut() {
            next.push(("alignment", alignment.next()));
        }
        if let Some((source, target)) = self.originals.as_mut() {
            next.push(("original source", source.next()));
            next.push(("original target", target.next()));
        }
        next
    }
}

impl<R: BufRead> Iterator for CorpusReader<R> {
    type Item = Result<PairRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let source_line = self.source.next();
        let companions = self.next_companions();

        let Some(source_line) = source_line else {
            self.finished = true;
            if companions.iter().any(|(_, line)| line.is_some()) {
                return self.mismatch("source");
            }
            return None;
        };

        let mut lines = Vec::with_capacity(companions.len());
        for (stream, line) in companions {
            match line {
                Some(Ok(line)) => lines.push(line),
                Some(Err(e)) => return self.fail(e.into()),
                None => return self.mismatch(stream),
            }
        }
        let source_line = match source_line {
            Ok(line) => line,
            Err(e) => return self.fail(e.into()),
        };

        let record = self.index;
        self.index += 1;
        Some(build_record(
            record,
            &source_line,
            lines,
            self.alignment.is_some(),
        ))
    }
}

fn build_record(
    index: usize,
    source_line: &str,
    companions: Vec<String>,
    has_alignment: bool,
) -> Result<PairRecord> {
    let mut companions = companions.into_iter();
    let target_line = companions.next().unwrap_or_default();
    let alignment = if has_alignment {
        companions.next()
    } else {
        None
    };
    let originals = match (companions.next(), companions.next()) {
        (Some(source), Some(target)) => Some((source.trim().to_string(), target.trim().to_string())),
        _ => None,
    };

    Ok(PairRecord {
        index,
        source: decode_tagged_line(source_line, index)?,
        target: decode_tagged_line(&target_line, index)?,
        alignment,
        originals,
    })
}
