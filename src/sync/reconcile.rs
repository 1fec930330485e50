/*!
 * Duration reconciliation between video and narration.
 *
 * The planning half is pure: given the two measured durations it decides
 * whether the video is kept, trimmed, or looped. Executing the plan is the
 * media engine's job.
 */

use crate::errors::AppError;

/// Within this tolerance the two durations are treated as already matching
pub const DURATION_TOLERANCE_SECONDS: f64 = 0.01;

/// How the video gets adjusted to match the narration length
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReconcilePlan {
    /// Durations already match within tolerance
    Keep,

    /// Video is longer; trim it to the narration length
    Trim,

    /// Video is shorter; repeat it `copies` times back-to-back, then trim
    /// the concatenation to the narration length
    Loop {
        /// Number of back-to-back copies before the final trim
        copies: u32,
    },
}

/// Decide how to adjust the video so its duration matches the narration.
///
/// A video whose duration sits at or below the tolerance cannot be looped
/// to any finite length and is rejected as invalid input.
pub fn plan_reconciliation(
    video_seconds: f64,
    narration_seconds: f64,
) -> Result<ReconcilePlan, AppError> {
    if narration_seconds <= 0.0 {
        return Err(AppError::InvalidInput(format!(
            "narration duration must be positive, got {narration_seconds}"
        )));
    }
    if video_seconds <= DURATION_TOLERANCE_SECONDS {
        return Err(AppError::InvalidInput(format!(
            "video duration {video_seconds}s is effectively zero and cannot be looped"
        )));
    }

    if (video_seconds - narration_seconds).abs() <= DURATION_TOLERANCE_SECONDS {
        return Ok(ReconcilePlan::Keep);
    }

    if video_seconds > narration_seconds {
        return Ok(ReconcilePlan::Trim);
    }

    let copies = (narration_seconds / video_seconds).ceil() as u32;
    Ok(ReconcilePlan::Loop { copies })
}
