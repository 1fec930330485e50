use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

// @module: Transcript segmentation into caption units

// @const: Sentence span regex; every input character lands in exactly one match
static SENTENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s).+?(?:[.!?](?:\s+|$)|$)").unwrap()
});

/// Default word count per caption for the word-count policy
pub const DEFAULT_WORDS_PER_CAPTION: usize = 4;

/// Default character cap before a sentence is re-split at commas
pub const DEFAULT_SENTENCE_CHAR_CAP: usize = 220;

// @struct: One displayable chunk of transcript text
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionUnit {
    // @field: Trimmed caption text, punctuation preserved
    pub text: String,

    // @field: Half-open character-index range into the segmented text;
    // consumed only by the alignment timing strategy
    pub source_span: Option<Range<usize>>,
}

/// Policy for turning raw transcript text into caption units
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentPolicy {
    /// Group whitespace-separated words into fixed-size chunks
    WordCount {
        /// Words per caption unit
        max_words: usize,
    },

    /// Split at sentence punctuation, re-splitting long sentences at commas
    Sentence {
        /// Character cap above which a sentence is re-split
        max_chars: usize,
    },
}

impl Default for SegmentPolicy {
    fn default() -> Self {
        SegmentPolicy::Sentence {
            max_chars: DEFAULT_SENTENCE_CHAR_CAP,
        }
    }
}

/// Split transcript text into an ordered sequence of caption units.
///
/// Units come back in input order; that order is the unit identity for the
/// rest of the pipeline. An empty or whitespace-only transcript yields no
/// units. Source spans are character indices (not bytes) into `text`, so
/// they can be projected onto a per-character alignment table.
pub fn segment(text: &str, policy: &SegmentPolicy) -> Vec<CaptionUnit> {
    match policy {
        SegmentPolicy::WordCount { max_words } => segment_words(text, *max_words),
        SegmentPolicy::Sentence { max_chars } => segment_sentences(text, *max_chars),
    }
}

/// Group whitespace-separated words into chunks of `max_words`, the trailing
/// remainder forming its own final unit.
fn segment_words(text: &str, max_words: usize) -> Vec<CaptionUnit> {
    let max_words = max_words.max(1);

    // Collect words with their character spans in a single scan
    let mut words: Vec<(usize, usize, String)> = Vec::new();
    let mut current = String::new();
    let mut word_start = 0usize;
    let mut char_count = 0usize;

    for (idx, ch) in text.chars().enumerate() {
        char_count = idx + 1;
        if ch.is_whitespace() {
            if !current.is_empty() {
                words.push((word_start, idx, std::mem::take(&mut current)));
            }
        } else {
            if current.is_empty() {
                word_start = idx;
            }
            current.push(ch);
        }
    }
    if !current.is_empty() {
        words.push((word_start, char_count, current));
    }

    words
        .chunks(max_words)
        .map(|chunk| {
            let joined = chunk
                .iter()
                .map(|(_, _, w)| w.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let first = chunk.first().map(|(s, _, _)| *s).unwrap_or(0);
            let last = chunk.last().map(|(_, e, _)| *e).unwrap_or(first);
            CaptionUnit {
                text: joined,
                source_span: Some(first..last),
            }
        })
        .collect()
}

/// Split text at sentence boundaries, keeping punctuation. Sentences longer
/// than `max_chars` are re-split at commas; a comma-free sentence over the
/// cap is emitted oversized rather than truncated.
fn segment_sentences(text: &str, max_chars: usize) -> Vec<CaptionUnit> {
    let max_chars = max_chars.max(1);
    let mut units = Vec::new();

    for span_match in SENTENCE_REGEX.find_iter(text) {
        let span_text = span_match.as_str();
        let trimmed = span_text.trim();
        if trimmed.is_empty() {
            // Whitespace-only span, skipped without consuming an index
            continue;
        }

        let span_char_start = text[..span_match.start()].chars().count();
        let span_char_len = span_text.chars().count();

        if trimmed.chars().count() <= max_chars {
            units.push(CaptionUnit {
                text: trimmed.to_string(),
                source_span: Some(span_char_start..span_char_start + span_char_len),
            });
        } else {
            split_long_sentence(span_text, span_char_start, max_chars, &mut units);
        }
    }

    units
}

/// Accumulate comma-delimited pieces of an oversized sentence into chunks
/// that each stay at or under the cap. Commas are retained.
fn split_long_sentence(
    span: &str,
    span_char_start: usize,
    max_chars: usize,
    units: &mut Vec<CaptionUnit>,
) {
    let mut chunk = String::new();
    let mut chunk_start = span_char_start;
    let mut cursor = span_char_start;

    for piece in span.split_inclusive(',') {
        let piece_chars = piece.chars().count();
        let candidate = format!("{chunk}{piece}");

        if candidate.trim().chars().count() > max_chars && !chunk.trim().is_empty() {
            units.push(CaptionUnit {
                text: chunk.trim().to_string(),
                source_span: Some(chunk_start..cursor),
            });
            chunk_start = cursor;
            chunk = piece.to_string();
        } else {
            chunk = candidate;
        }
        cursor += piece_chars;
    }

    if !chunk.trim().is_empty() {
        units.push(CaptionUnit {
            text: chunk.trim().to_string(),
            source_span: Some(chunk_start..cursor),
        });
    }
}
