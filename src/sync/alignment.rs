/*!
 * Provider-supplied per-character timing tables.
 *
 * A speech provider that reports alignment returns three parallel arrays:
 * the characters it actually spoke and, per character, nullable start and
 * end times in seconds. Array-length invariants are enforced here, at the
 * boundary, so inconsistent indices never reach the timing strategies.
 */

use std::ops::Range;

use crate::errors::AppError;

/// Per-character timing table covering the spoken text
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentTable {
    /// Characters of the spoken text, in order
    characters: Vec<char>,

    /// Start time per character; the provider may omit silence timing
    start_times: Vec<Option<f64>>,

    /// End time per character; the provider may omit silence timing
    end_times: Vec<Option<f64>>,
}

impl AlignmentTable {
    /// Build a validated table from provider arrays.
    ///
    /// The three arrays must have equal lengths; anything else is an
    /// `AlignmentMismatch` and fails the request before any timing math.
    pub fn new(
        characters: Vec<char>,
        start_times: Vec<Option<f64>>,
        end_times: Vec<Option<f64>>,
    ) -> Result<Self, AppError> {
        if characters.len() != start_times.len() || characters.len() != end_times.len() {
            return Err(AppError::AlignmentMismatch(format!(
                "alignment arrays disagree in length: {} characters, {} start times, {} end times",
                characters.len(),
                start_times.len(),
                end_times.len()
            )));
        }

        Ok(AlignmentTable {
            characters,
            start_times,
            end_times,
        })
    }

    /// Number of characters covered by the table
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Whether the table covers no characters at all
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// The text the provider actually spoke, reconstructed from the table.
    ///
    /// This can differ from the literal input transcript after provider-side
    /// normalization, and is the text caption units must be segmented from
    /// when this table drives timing.
    pub fn spoken_text(&self) -> String {
        self.characters.iter().collect()
    }

    /// Project a half-open character span onto provider time.
    ///
    /// Collects every non-whitespace character in the span that carries a
    /// time, and returns the span's earliest start (clamped to zero) and
    /// latest end. `Ok(None)` means the span holds no usable timed
    /// characters; the caller decides whether that drops the unit or fails
    /// the run. A span reaching past the table is an `AlignmentMismatch`.
    pub fn project_span(&self, span: &Range<usize>) -> Result<Option<(f64, f64)>, AppError> {
        if span.end > self.len() {
            return Err(AppError::AlignmentMismatch(format!(
                "caption span {}..{} exceeds alignment table length {}",
                span.start,
                span.end,
                self.len()
            )));
        }

        let mut earliest: Option<f64> = None;
        let mut latest: Option<f64> = None;

        for idx in span.clone() {
            if self.characters[idx].is_whitespace() {
                continue;
            }
            if let Some(start) = self.start_times[idx] {
                earliest = Some(match earliest {
                    Some(current) => current.min(start),
                    None => start,
                });
            }
            if let Some(end) = self.end_times[idx] {
                latest = Some(match latest {
                    Some(current) => current.max(end),
                    None => end,
                });
            }
        }

        match (earliest, latest) {
            (Some(start), Some(end)) => Ok(Some((start.max(0.0), end))),
            _ => Ok(None),
        }
    }
}
