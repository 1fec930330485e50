use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, error};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::errors::AppError;
use crate::media::{MediaEngine, NarrationTrack, VideoTrack};
use crate::sync::schedule::{CaptionEvent, CaptionSchedule};

// @module: ffmpeg/ffprobe-backed media engine

/// Timeout for probe calls
const PROBE_TIMEOUT_SECS: u64 = 60;

/// Timeout for transform and render calls
const TRANSFORM_TIMEOUT_SECS: u64 = 600;

/// Default caption font size in pixels
pub const DEFAULT_FONT_SIZE: u32 = 60;

/// Media engine shelling out to ffmpeg and ffprobe
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    /// Caption font size in pixels
    font_size: u32,
}

/// ffprobe JSON output, reduced to the fields we read
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    // ffprobe reports duration as a decimal string
    duration: Option<String>,
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_SIZE)
    }
}

impl FfmpegEngine {
    /// Create a new engine with the given caption font size
    pub fn new(font_size: u32) -> Self {
        Self { font_size }
    }

    /// Run a tool to completion with a timeout, returning stdout
    async fn run_tool(program: &str, args: &[String], timeout_secs: u64) -> Result<Vec<u8>> {
        debug!("Running {} {}", program, args.join(" "));

        let tool_future = Command::new(program).args(args).output();
        let timeout_duration = std::time::Duration::from_secs(timeout_secs);
        let output = tokio::select! {
            result = tool_future => {
                result.map_err(|e| anyhow!("Failed to execute {} command: {}", program, e))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(anyhow!("{} command timed out after {} seconds", program, timeout_secs));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr.lines().rev().take(8).collect::<Vec<_>>().into_iter().rev().collect::<Vec<_>>().join("\n");
            error!("{} failed: {}", program, tail);
            return Err(anyhow!("{} failed: {}", program, tail));
        }

        Ok(output.stdout)
    }

    async fn probe(path: &Path, with_streams: bool) -> Result<ProbeOutput> {
        let mut args = vec![
            "-v".to_string(),
            "quiet".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
        ];
        if with_streams {
            args.push("-show_streams".to_string());
            args.push("-select_streams".to_string());
            args.push("v:0".to_string());
        }
        args.push(path.to_string_lossy().to_string());

        let stdout = Self::run_tool("ffprobe", &args, PROBE_TIMEOUT_SECS).await?;
        let parsed: ProbeOutput = serde_json::from_slice(&stdout)
            .map_err(|e| anyhow!("Failed to parse ffprobe output: {}", e))?;
        Ok(parsed)
    }

    fn parse_duration(probe: &ProbeOutput, path: &Path) -> Result<f64> {
        probe
            .format
            .as_ref()
            .and_then(|f| f.duration.as_ref())
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| anyhow!("No duration reported for {:?}", path))
    }

    /// Build the drawtext filter chain for the whole caption schedule
    fn caption_filter(&self, schedule: &CaptionSchedule) -> String {
        schedule
            .events
            .iter()
            .map(|event| self.drawtext(event))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn drawtext(&self, event: &CaptionEvent) -> String {
        let y = match event.position.y_offset {
            0 => "(h-text_h)/2".to_string(),
            offset if offset > 0 => format!("(h-text_h)/2+{}", offset),
            offset => format!("(h-text_h)/2-{}", -offset),
        };

        format!(
            "drawtext=text='{}':fontsize={}:fontcolor=white:borderw=2:bordercolor=black:x=(w-text_w)/2:y={}:enable='between(t,{:.3},{:.3})'",
            escape_drawtext(&event.text),
            self.font_size,
            y,
            event.start_seconds,
            event.end_seconds(),
        )
    }
}

/// Escape caption text for use inside a single-quoted drawtext value.
///
/// A literal quote closes the quoted run, emits an escaped quote, and
/// reopens it; backslashes are doubled first.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', r"'\''")
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn probe_video(&self, path: &Path) -> Result<VideoTrack, AppError> {
        let probe = Self::probe(path, true)
            .await
            .map_err(|e| AppError::Media(e.to_string()))?;

        let duration = Self::parse_duration(&probe, path).map_err(|e| AppError::Media(e.to_string()))?;
        let stream = probe
            .streams
            .first()
            .ok_or_else(|| AppError::Media(format!("No video stream found in {:?}", path)))?;
        let (width, height) = match (stream.width, stream.height) {
            (Some(w), Some(h)) => (w, h),
            _ => return Err(AppError::Media(format!("No geometry reported for {:?}", path))),
        };

        Ok(VideoTrack {
            path: path.to_path_buf(),
            duration_seconds: duration,
            width,
            height,
        })
    }

    async fn probe_audio(&self, path: &Path) -> Result<NarrationTrack, AppError> {
        let probe = Self::probe(path, false)
            .await
            .map_err(|e| AppError::Media(e.to_string()))?;
        let duration = Self::parse_duration(&probe, path).map_err(|e| AppError::Media(e.to_string()))?;

        Ok(NarrationTrack {
            path: path.to_path_buf(),
            duration_seconds: duration,
        })
    }

    async fn concat_audio(
        &self,
        clips: &[PathBuf],
        output: &Path,
    ) -> Result<NarrationTrack, AppError> {
        if clips.is_empty() {
            return Err(AppError::Media("No audio clips to concatenate".to_string()));
        }

        // concat demuxer list; single quotes in paths need the close-escape-reopen dance
        let list_path = output.with_extension("concat.txt");
        let list_body = clips
            .iter()
            .map(|clip| format!("file '{}'", clip.to_string_lossy().replace('\'', r"'\''")))
            .collect::<Vec<_>>()
            .join("\n");
        tokio::fs::write(&list_path, list_body)
            .await
            .map_err(|e| AppError::Media(format!("Failed to write concat list: {}", e)))?;

        let args = vec![
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_path.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            output.to_string_lossy().to_string(),
        ];
        Self::run_tool("ffmpeg", &args, TRANSFORM_TIMEOUT_SECS)
            .await
            .map_err(|e| AppError::Media(e.to_string()))?;

        self.probe_audio(output).await
    }

    async fn trim_video(
        &self,
        video: &VideoTrack,
        duration_seconds: f64,
        output: &Path,
    ) -> Result<VideoTrack, AppError> {
        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            video.path.to_string_lossy().to_string(),
            "-t".to_string(),
            format!("{:.3}", duration_seconds),
            "-an".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "veryfast".to_string(),
            output.to_string_lossy().to_string(),
        ];
        Self::run_tool("ffmpeg", &args, TRANSFORM_TIMEOUT_SECS)
            .await
            .map_err(|e| AppError::Media(e.to_string()))?;

        Ok(VideoTrack {
            path: output.to_path_buf(),
            duration_seconds,
            width: video.width,
            height: video.height,
        })
    }

    async fn loop_video(
        &self,
        video: &VideoTrack,
        copies: u32,
        duration_seconds: f64,
        output: &Path,
    ) -> Result<VideoTrack, AppError> {
        if copies == 0 {
            return Err(AppError::Media("Loop copy count must be at least one".to_string()));
        }

        // -stream_loop n plays the input n+1 times
        let args = vec![
            "-y".to_string(),
            "-stream_loop".to_string(),
            (copies - 1).to_string(),
            "-i".to_string(),
            video.path.to_string_lossy().to_string(),
            "-t".to_string(),
            format!("{:.3}", duration_seconds),
            "-an".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "veryfast".to_string(),
            output.to_string_lossy().to_string(),
        ];
        Self::run_tool("ffmpeg", &args, TRANSFORM_TIMEOUT_SECS)
            .await
            .map_err(|e| AppError::Media(e.to_string()))?;

        Ok(VideoTrack {
            path: output.to_path_buf(),
            duration_seconds,
            width: video.width,
            height: video.height,
        })
    }

    async fn crop_vertical(
        &self,
        video: &VideoTrack,
        width: u32,
        height: u32,
        output: &Path,
    ) -> Result<VideoTrack, AppError> {
        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            video.path.to_string_lossy().to_string(),
            "-vf".to_string(),
            format!("scale=-2:{height},crop={width}:{height}"),
            "-an".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "veryfast".to_string(),
            output.to_string_lossy().to_string(),
        ];
        Self::run_tool("ffmpeg", &args, TRANSFORM_TIMEOUT_SECS)
            .await
            .map_err(|e| AppError::Media(e.to_string()))?;

        Ok(VideoTrack {
            path: output.to_path_buf(),
            duration_seconds: video.duration_seconds,
            width,
            height,
        })
    }

    async fn render_composite(
        &self,
        video: &VideoTrack,
        narration: &NarrationTrack,
        schedule: &CaptionSchedule,
        output: &Path,
    ) -> Result<PathBuf, AppError> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            video.path.to_string_lossy().to_string(),
            "-i".to_string(),
            narration.path.to_string_lossy().to_string(),
            "-map".to_string(),
            "0:v".to_string(),
            "-map".to_string(),
            "1:a".to_string(),
        ];

        if !schedule.is_empty() {
            args.push("-vf".to_string());
            args.push(self.caption_filter(schedule));
        }

        args.extend([
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "veryfast".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-shortest".to_string(),
            output.to_string_lossy().to_string(),
        ]);

        Self::run_tool("ffmpeg", &args, TRANSFORM_TIMEOUT_SECS)
            .await
            .map_err(|e| AppError::Render(e.to_string()))?;

        Ok(output.to_path_buf())
    }
}
