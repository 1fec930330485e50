/*!
 * Timing strategies for caption units.
 *
 * Each strategy derives one `TimingEntry` per caption unit, in unit order.
 * The three variants observed in practice are modeled as one enum selected
 * at pipeline construction time rather than three separate code paths:
 *
 * - `Uniform`: divide a known narration duration evenly across all units
 * - `Alignment`: project unit character spans onto a provider timing table
 * - `PerClip`: lay independently synthesized clips back-to-back
 */

use log::warn;

use crate::errors::AppError;
use crate::segmenter::CaptionUnit;
use crate::sync::alignment::AlignmentTable;

/// Floor applied to every caption duration so degenerate spans never reach
/// the renderer as zero-length overlays
pub const MIN_CAPTION_SECONDS: f64 = 0.01;

// @struct: Time window assigned to one caption unit
#[derive(Debug, Clone, PartialEq)]
pub struct TimingEntry {
    // @field: Index of the unit in segmenter output
    pub unit_index: usize,

    // @field: Start offset in seconds on the narration timeline
    pub start_seconds: f64,

    // @field: Display duration in seconds, never below the floor
    pub duration_seconds: f64,
}

/// Source of truth for unit timing, chosen per request
#[derive(Debug)]
pub enum TimingSource {
    /// Total narration duration divided evenly across all units
    Uniform {
        /// Measured narration duration in seconds
        total_seconds: f64,
    },

    /// Per-character timing table from the speech provider
    Alignment {
        /// Validated alignment table covering the spoken text
        table: AlignmentTable,
    },

    /// One independently synthesized clip per unit, laid out back-to-back
    PerClip {
        /// Measured clip duration per unit, in unit order
        clip_seconds: Vec<f64>,
    },
}

/// Compute one timing entry per caption unit, in unit order.
///
/// Under the alignment strategy a unit whose span holds no usable timed
/// characters is dropped rather than failing the run; the gap is visible to
/// callers as a shorter result and a warn-level log line. The other two
/// strategies always produce exactly one entry per unit.
pub fn compute_timings(
    units: &[CaptionUnit],
    source: &TimingSource,
) -> Result<Vec<TimingEntry>, AppError> {
    if units.is_empty() {
        return Err(AppError::InvalidInput(
            "cannot compute timings for an empty unit sequence".to_string(),
        ));
    }

    match source {
        TimingSource::Uniform { total_seconds } => uniform_timings(units, *total_seconds),
        TimingSource::Alignment { table } => alignment_timings(units, table),
        TimingSource::PerClip { clip_seconds } => per_clip_timings(units, clip_seconds),
    }
}

fn uniform_timings(units: &[CaptionUnit], total_seconds: f64) -> Result<Vec<TimingEntry>, AppError> {
    if total_seconds <= 0.0 {
        return Err(AppError::InvalidInput(format!(
            "narration duration must be positive, got {total_seconds}"
        )));
    }

    let duration = (total_seconds / units.len() as f64).max(MIN_CAPTION_SECONDS);
    Ok((0..units.len())
        .map(|i| TimingEntry {
            unit_index: i,
            start_seconds: i as f64 * duration,
            duration_seconds: duration,
        })
        .collect())
}

fn alignment_timings(
    units: &[CaptionUnit],
    table: &AlignmentTable,
) -> Result<Vec<TimingEntry>, AppError> {
    let mut entries = Vec::with_capacity(units.len());

    for (index, unit) in units.iter().enumerate() {
        let span = unit.source_span.as_ref().ok_or_else(|| {
            AppError::InvalidInput(format!(
                "caption unit {index} has no source span; alignment timing requires spans"
            ))
        })?;

        match table.project_span(span)? {
            Some((start, end)) => {
                entries.push(TimingEntry {
                    unit_index: index,
                    start_seconds: start,
                    duration_seconds: (end - start).max(MIN_CAPTION_SECONDS),
                });
            }
            None => {
                // Intentional graceful degradation for punctuation-only or
                // silence-only spans; the run continues without this caption
                warn!(
                    "Dropping caption unit {} (\"{}\"): no timed characters in span",
                    index, unit.text
                );
            }
        }
    }

    Ok(entries)
}

fn per_clip_timings(
    units: &[CaptionUnit],
    clip_seconds: &[f64],
) -> Result<Vec<TimingEntry>, AppError> {
    if clip_seconds.len() != units.len() {
        return Err(AppError::InvalidInput(format!(
            "per-clip timing needs one clip per unit: {} clips for {} units",
            clip_seconds.len(),
            units.len()
        )));
    }

    let mut cursor = 0.0_f64;
    let mut entries = Vec::with_capacity(units.len());
    for (index, clip) in clip_seconds.iter().enumerate() {
        let duration = clip.max(MIN_CAPTION_SECONDS);
        entries.push(TimingEntry {
            unit_index: index,
            start_seconds: cursor,
            duration_seconds: duration,
        });
        cursor += duration;
    }

    Ok(entries)
}
