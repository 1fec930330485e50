/*!
 * Media capabilities consumed by the pipeline.
 *
 * Decoding, trimming, looping, cropping, concatenation and the final
 * composite render are external concerns. They sit behind the
 * `MediaEngine` trait so the pipeline can be exercised in tests without
 * ffmpeg installed; `FfmpegEngine` is the production implementation.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::errors::AppError;
use crate::sync::schedule::CaptionSchedule;

/// A decodable video file with its measured duration and geometry.
///
/// Tracks are read-only; every adjustment produces a new derived track at a
/// new path.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoTrack {
    /// Location of the video file
    pub path: PathBuf,

    /// Measured duration in seconds
    pub duration_seconds: f64,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,
}

/// The continuous narration audio to be muxed with the video
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationTrack {
    /// Location of the audio file
    pub path: PathBuf,

    /// Measured duration in seconds
    pub duration_seconds: f64,
}

/// Common trait for media processing backends
#[async_trait]
pub trait MediaEngine: Send + Sync + Debug {
    /// Probe a video file for duration and geometry
    async fn probe_video(&self, path: &Path) -> Result<VideoTrack, AppError>;

    /// Probe an audio file for duration
    async fn probe_audio(&self, path: &Path) -> Result<NarrationTrack, AppError>;

    /// Concatenate audio clips back-to-back, in order, into one track.
    ///
    /// Any unreadable clip fails the whole assembly; no partial narration
    /// is produced.
    async fn concat_audio(&self, clips: &[PathBuf], output: &Path)
        -> Result<NarrationTrack, AppError>;

    /// Trim a video to `[0, duration)` seconds
    async fn trim_video(
        &self,
        video: &VideoTrack,
        duration_seconds: f64,
        output: &Path,
    ) -> Result<VideoTrack, AppError>;

    /// Repeat a video `copies` times back-to-back, trimmed to `duration_seconds`
    async fn loop_video(
        &self,
        video: &VideoTrack,
        copies: u32,
        duration_seconds: f64,
        output: &Path,
    ) -> Result<VideoTrack, AppError>;

    /// Scale to the target height, then center-crop to the target geometry.
    ///
    /// Pure framing transform; duration is untouched.
    async fn crop_vertical(
        &self,
        video: &VideoTrack,
        width: u32,
        height: u32,
        output: &Path,
    ) -> Result<VideoTrack, AppError>;

    /// Mux video and narration and burn in the caption schedule.
    ///
    /// Supports any number of caption events, each with its own start,
    /// duration and position. Returns the path of the rendered file.
    async fn render_composite(
        &self,
        video: &VideoTrack,
        narration: &NarrationTrack,
        schedule: &CaptionSchedule,
        output: &Path,
    ) -> Result<PathBuf, AppError>;
}

pub mod ffmpeg;
