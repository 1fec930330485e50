/*!
 * The final caption schedule handed to the compositor.
 *
 * Pairs surviving caption units with their timing entries, in unit order,
 * and attaches the on-screen position policy. The schedule is built once
 * per request and consumed once by the render step.
 */

use crate::errors::AppError;
use crate::segmenter::CaptionUnit;
use crate::sync::timing::TimingEntry;

/// Overlap beyond this is a defect, not floating rounding
const OVERLAP_TOLERANCE_SECONDS: f64 = 0.001;

/// On-screen placement applied uniformly to every caption
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaptionPosition {
    /// Vertical pixel offset from the centered position; positive moves down
    pub y_offset: i32,
}

/// One render-ready caption with its time window
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEvent {
    /// Caption text
    pub text: String,

    /// Start offset in seconds on the narration timeline
    pub start_seconds: f64,

    /// Display duration in seconds
    pub duration_seconds: f64,

    /// On-screen placement
    pub position: CaptionPosition,
}

impl CaptionEvent {
    /// End of the event's time window in seconds
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }
}

/// Ordered, non-overlapping caption timeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionSchedule {
    /// Events in unit order, which is also start-time order
    pub events: Vec<CaptionEvent>,
}

impl CaptionSchedule {
    /// Number of scheduled captions
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the schedule holds no captions
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// End of the last caption window, or zero for an empty schedule
    pub fn total_span_seconds(&self) -> f64 {
        self.events.last().map(CaptionEvent::end_seconds).unwrap_or(0.0)
    }
}

/// Combine caption units and their timing entries into the final schedule.
///
/// Timing entries reference units by index; units dropped by the timing
/// strategy are simply absent, and the remaining events keep segmenter
/// order. Back-to-back windows are valid; overlap beyond rounding is an
/// internal invariant violation and fails the build.
pub fn build_schedule(
    units: &[CaptionUnit],
    timings: &[TimingEntry],
    position: CaptionPosition,
) -> Result<CaptionSchedule, AppError> {
    let mut events: Vec<CaptionEvent> = Vec::with_capacity(timings.len());

    for entry in timings {
        let unit = units.get(entry.unit_index).ok_or_else(|| {
            AppError::Unknown(format!(
                "timing entry references unit {} but only {} units exist",
                entry.unit_index,
                units.len()
            ))
        })?;

        if let Some(previous) = events.last() {
            if entry.start_seconds + OVERLAP_TOLERANCE_SECONDS < previous.end_seconds() {
                return Err(AppError::Unknown(format!(
                    "overlapping caption events: unit {} starts at {:.3}s before the previous window ends at {:.3}s",
                    entry.unit_index,
                    entry.start_seconds,
                    previous.end_seconds()
                )));
            }
        }

        events.push(CaptionEvent {
            text: unit.text.clone(),
            start_seconds: entry.start_seconds,
            duration_seconds: entry.duration_seconds,
            position,
        });
    }

    Ok(CaptionSchedule { events })
}
