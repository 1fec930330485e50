/*!
 * End-to-end narration pipeline.
 *
 * One `Pipeline::run` handles one request: validate the inputs, segment
 * the transcript, obtain timing under the configured strategy, assemble
 * the narration track, reconcile the video length, build the caption
 * schedule and hand the composite request to the media engine. Nothing is
 * shared across runs; every intermediate artifact lives in a scratch
 * directory owned by the run.
 */

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::app_config::{Config, SpeechProviderKind, TimingStrategy};
use crate::errors::AppError;
use crate::file_utils::{FileManager, WorkDir};
use crate::media::ffmpeg::FfmpegEngine;
use crate::media::{MediaEngine, NarrationTrack};
use crate::providers::elevenlabs::ElevenLabs;
use crate::providers::openai::OpenAI;
use crate::providers::SpeechProvider;
use crate::segmenter::{segment, CaptionUnit, SegmentPolicy};
use crate::sync::alignment::AlignmentTable;
use crate::sync::reconcile::{plan_reconciliation, ReconcilePlan};
use crate::sync::schedule::{build_schedule, CaptionPosition};
use crate::sync::timing::{compute_timings, TimingEntry, TimingSource, MIN_CAPTION_SECONDS};

/// One render request, resolved to concrete paths
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Background video file
    pub video_path: PathBuf,

    /// Raw transcript text file
    pub transcript_path: PathBuf,

    /// Provider voice identifier; falls back to the configured voice
    pub voice: Option<String>,

    /// Where the rendered video lands
    pub output_path: PathBuf,
}

/// Summary of a completed pipeline run
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Path of the rendered video
    pub output_path: PathBuf,

    /// Caption units produced by segmentation
    pub units_total: usize,

    /// Units dropped because their timing could not be resolved
    pub units_dropped: usize,

    /// Final narration duration in seconds
    pub narration_seconds: f64,
}

/// Main pipeline for narrated caption rendering
pub struct Pipeline {
    // @field: App configuration
    config: Config,

    // @field: Speech synthesis provider
    provider: Arc<dyn SpeechProvider>,

    // @field: Media processing backend
    engine: Arc<dyn MediaEngine>,
}

impl Pipeline {
    /// Create a pipeline with explicit provider and engine (used by tests)
    pub fn new(config: Config, provider: Arc<dyn SpeechProvider>, engine: Arc<dyn MediaEngine>) -> Self {
        Self {
            config,
            provider,
            engine,
        }
    }

    // @method: Create a pipeline with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let speech = &config.speech;
        let provider: Arc<dyn SpeechProvider> = match speech.provider {
            SpeechProviderKind::ElevenLabs => Arc::new(ElevenLabs::new(
                speech.get_api_key(),
                speech.get_endpoint(),
                speech.get_model(),
            )),
            SpeechProviderKind::OpenAI => Arc::new(OpenAI::new(
                speech.get_api_key(),
                speech.get_endpoint(),
                speech.get_model(),
            )),
        };
        let engine = Arc::new(FfmpegEngine::new(config.render.font_size));

        Ok(Self {
            config,
            provider,
            engine,
        })
    }

    /// Run the full pipeline for one request
    pub async fn run(&self, request: RenderRequest) -> Result<RenderOutcome, AppError> {
        if !FileManager::file_exists(&request.video_path) {
            return Err(AppError::InvalidInput(format!(
                "video file not found: {:?}",
                request.video_path
            )));
        }
        if !FileManager::file_exists(&request.transcript_path) {
            return Err(AppError::InvalidInput(format!(
                "transcript file not found: {:?}",
                request.transcript_path
            )));
        }

        let transcript = FileManager::read_to_string(&request.transcript_path)
            .map_err(|e| AppError::File(e.to_string()))?;
        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            return Err(AppError::InvalidInput(
                "transcript is empty after trimming".to_string(),
            ));
        }

        let voice = request
            .voice
            .clone()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.config.speech.get_voice());
        if voice.is_empty() {
            return Err(AppError::InvalidInput(
                "missing voice identifier: pass --voice or set one in the config".to_string(),
            ));
        }

        let workdir = WorkDir::new().map_err(|e| AppError::File(e.to_string()))?;

        // Unreadable input video is the caller's problem, not a media failure
        let video = self
            .engine
            .probe_video(&request.video_path)
            .await
            .map_err(|e| {
                AppError::InvalidInput(format!(
                    "could not read video {:?}: {}",
                    request.video_path, e
                ))
            })?;

        let policy = self.config.segmentation.to_policy();
        let strategy = self.config.timing_strategy;
        info!(
            "🚀 StorySync: {} provider, {} timing",
            self.config.speech.provider.display_name(),
            strategy
        );

        let (units, timings, narration) = match strategy {
            TimingStrategy::Uniform => {
                self.run_uniform(&transcript, &voice, &policy, &workdir).await?
            }
            TimingStrategy::Alignment => {
                self.run_alignment(&transcript, &voice, &policy, &workdir).await?
            }
            TimingStrategy::PerClip => {
                self.run_per_clip(&transcript, &voice, &policy, &workdir).await?
            }
        };

        let units_total = units.len();
        let units_dropped = units_total - timings.len();
        if units_dropped > 0 {
            warn!(
                "{} of {} caption units dropped without resolvable timing",
                units_dropped, units_total
            );
        }

        // Align video length with narration length
        let plan = plan_reconciliation(video.duration_seconds, narration.duration_seconds)?;
        let adjusted = match plan {
            ReconcilePlan::Keep => video.clone(),
            ReconcilePlan::Trim => {
                self.engine
                    .trim_video(&video, narration.duration_seconds, &workdir.file("story.mp4"))
                    .await?
            }
            ReconcilePlan::Loop { copies } => {
                self.engine
                    .loop_video(
                        &video,
                        copies,
                        narration.duration_seconds,
                        &workdir.file("story.mp4"),
                    )
                    .await?
            }
        };

        let adjusted = if self.config.render.vertical_format {
            self.engine
                .crop_vertical(
                    &adjusted,
                    self.config.render.vertical_width,
                    self.config.render.vertical_height,
                    &workdir.file("story_vertical.mp4"),
                )
                .await?
        } else {
            adjusted
        };

        let position = CaptionPosition {
            y_offset: self.config.render.caption_y_offset,
        };
        let schedule = build_schedule(&units, &timings, position)?;

        if let Some(parent) = request.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                FileManager::ensure_dir(parent).map_err(|e| AppError::File(e.to_string()))?;
            }
        }

        // Render into the scratch directory; the artifact only leaves it
        // after the compositor succeeds, so a failed render retains nothing
        let rendered = self
            .engine
            .render_composite(&adjusted, &narration, &schedule, &workdir.file("final_story.mp4"))
            .await?;
        tokio::fs::copy(&rendered, &request.output_path)
            .await
            .map_err(|e| AppError::File(format!("failed to persist output: {}", e)))?;

        info!(
            "Rendered {} captions over {:.2}s of narration to {:?}",
            schedule.len(),
            narration.duration_seconds,
            request.output_path
        );

        Ok(RenderOutcome {
            output_path: request.output_path.clone(),
            units_total,
            units_dropped,
            narration_seconds: narration.duration_seconds,
        })
        // workdir drops here, removing every intermediate artifact
    }

    /// Uniform strategy: one narration call, duration divided evenly
    async fn run_uniform(
        &self,
        transcript: &str,
        voice: &str,
        policy: &SegmentPolicy,
        workdir: &WorkDir,
    ) -> Result<(Vec<CaptionUnit>, Vec<TimingEntry>, NarrationTrack), AppError> {
        let units = segment(transcript, policy);
        if units.is_empty() {
            return Err(AppError::InvalidInput(
                "transcript produced no caption units".to_string(),
            ));
        }

        let clip = self.provider.synthesize(transcript, voice).await?;
        let narration_path = workdir.file("narration.mp3");
        tokio::fs::write(&narration_path, &clip.audio)
            .await
            .map_err(|e| AppError::File(e.to_string()))?;
        let narration = self.engine.probe_audio(&narration_path).await?;

        let timings = compute_timings(
            &units,
            &TimingSource::Uniform {
                total_seconds: narration.duration_seconds,
            },
        )?;

        Ok((units, timings, narration))
    }

    /// Alignment strategy: one narration call plus a character timing payload
    async fn run_alignment(
        &self,
        transcript: &str,
        voice: &str,
        policy: &SegmentPolicy,
        workdir: &WorkDir,
    ) -> Result<(Vec<CaptionUnit>, Vec<TimingEntry>, NarrationTrack), AppError> {
        if !self.provider.supports_alignment() {
            return Err(AppError::InvalidInput(format!(
                "{} cannot return alignment payloads; choose another timing strategy",
                self.config.speech.provider.display_name()
            )));
        }

        let aligned = self
            .provider
            .synthesize_with_alignment(transcript, voice)
            .await?;

        let narration_path = workdir.file("narration.mp3");
        tokio::fs::write(&narration_path, &aligned.audio)
            .await
            .map_err(|e| AppError::File(e.to_string()))?;
        let narration = self.engine.probe_audio(&narration_path).await?;

        // Array-length invariants are enforced here, before any timing math
        let table = AlignmentTable::new(aligned.characters, aligned.start_times, aligned.end_times)?;

        // Segment the text the provider actually spoke: normalization may
        // have diverged from the input transcript, and unit spans must index
        // the table
        let spoken = table.spoken_text();
        let units = segment(&spoken, policy);
        if units.is_empty() {
            return Err(AppError::AlignmentMismatch(
                "alignment table covers no speakable text".to_string(),
            ));
        }

        let timings = compute_timings(&units, &TimingSource::Alignment { table })?;
        if timings.is_empty() {
            return Err(AppError::AlignmentMismatch(
                "no caption unit had usable alignment data".to_string(),
            ));
        }

        Ok((units, timings, narration))
    }

    /// Per-clip strategy: one synthesis call per unit, laid back-to-back
    async fn run_per_clip(
        &self,
        transcript: &str,
        voice: &str,
        policy: &SegmentPolicy,
        workdir: &WorkDir,
    ) -> Result<(Vec<CaptionUnit>, Vec<TimingEntry>, NarrationTrack), AppError> {
        let units = segment(transcript, policy);
        if units.is_empty() {
            return Err(AppError::InvalidInput(
                "transcript produced no caption units".to_string(),
            ));
        }

        let max_concurrent = self.config.speech.optimal_concurrent_requests().max(1);
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        let progress = ProgressBar::new(units.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} clips ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(template_result.progress_chars("█▓▒░"));

        let clamp_warnings = Arc::new(Mutex::new(Vec::<String>::new()));

        // Fan out synthesis across the concurrency budget
        let results = stream::iter(units.iter().enumerate())
            .map(|(index, unit)| {
                let provider = Arc::clone(&self.provider);
                let engine = Arc::clone(&self.engine);
                let semaphore = Arc::clone(&semaphore);
                let progress = progress.clone();
                let warnings = Arc::clone(&clamp_warnings);
                let voice = voice.to_string();
                let text = unit.text.clone();
                let clip_path = workdir.file(&format!("seg_{index:04}.mp3"));

                async move {
                    // Acquire a permit from the semaphore to limit concurrent requests
                    let _permit = semaphore
                        .acquire()
                        .await
                        .expect("Semaphore should not be closed");

                    let clip = provider.synthesize(&text, &voice).await?;
                    tokio::fs::write(&clip_path, &clip.audio)
                        .await
                        .map_err(|e| AppError::File(e.to_string()))?;
                    let measured = engine.probe_audio(&clip_path).await?;

                    if measured.duration_seconds < MIN_CAPTION_SECONDS {
                        warnings.lock().push(format!(
                            "clip {} measured at {:.3}s, clamping to the caption floor",
                            index, measured.duration_seconds
                        ));
                    }

                    progress.inc(1);
                    Ok::<(usize, PathBuf, f64), AppError>((index, clip_path, measured.duration_seconds))
                }
            })
            .buffer_unordered(max_concurrent)
            .collect::<Vec<_>>()
            .await;

        progress.finish_and_clear();
        for line in clamp_warnings.lock().iter() {
            warn!("{}", line);
        }

        // Fan-in barrier: every clip must be in before any start time can be
        // computed; completion order is arbitrary, so restore unit order
        let mut clips = Vec::with_capacity(results.len());
        for result in results {
            clips.push(result?);
        }
        clips.sort_by_key(|(index, _, _)| *index);

        let clip_paths: Vec<PathBuf> = clips.iter().map(|(_, path, _)| path.clone()).collect();
        let clip_seconds: Vec<f64> = clips.iter().map(|(_, _, seconds)| *seconds).collect();

        let timings = compute_timings(&units, &TimingSource::PerClip { clip_seconds })?;
        let narration = self
            .engine
            .concat_audio(&clip_paths, &workdir.file("narration.mp3"))
            .await?;

        Ok((units, timings, narration))
    }
}
