/*!
 * # StorySync - Narrated Story Video Generator
 *
 * A Rust library for turning a text transcript and a background video into
 * a narrated, captioned story video.
 *
 * ## Features
 *
 * - Split transcripts into caption-sized units (word-count or sentence policy)
 * - Synthesize narration using hosted TTS providers:
 *   - ElevenLabs (with optional per-character timing)
 *   - OpenAI speech API
 * - Three caption timing strategies: uniform, alignment payload, per-clip
 * - Reconcile video length against narration (trim or loop)
 * - Burn frame-accurate captions into the final render
 * - Optional 9:16 vertical framing for short-form output
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `segmenter`: Transcript segmentation into caption units
 * - `sync`: Timing, reconciliation and caption scheduling:
 *   - `sync::alignment`: Provider character timing tables
 *   - `sync::timing`: The three timing strategies
 *   - `sync::reconcile`: Video/narration duration reconciliation
 *   - `sync::schedule`: The final caption schedule
 * - `providers`: Client implementations for speech providers:
 *   - `providers::elevenlabs`: ElevenLabs API client
 *   - `providers::openai`: OpenAI speech API client
 *   - `providers::mock`: Deterministic provider for tests
 * - `media`: Media engine trait and the ffmpeg implementation
 * - `pipeline`: Main request pipeline
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod file_utils;
pub mod media;
pub mod pipeline;
pub mod providers;
pub mod segmenter;
pub mod sync;

// Re-export main types for easier usage
pub use app_config::{Config, SpeechProviderKind, TimingStrategy};
pub use errors::{AppError, ProviderError};
pub use pipeline::{Pipeline, RenderOutcome, RenderRequest};
pub use segmenter::{segment, CaptionUnit, SegmentPolicy};
pub use sync::{build_schedule, compute_timings, CaptionSchedule, TimingEntry, TimingSource};
