/*!
 * Timeline synchronization for narration and captions.
 *
 * This module turns segmented caption units plus a timing source into a
 * render-ready caption schedule, and reconciles video length against
 * narration length. It is split into several submodules:
 *
 * - `alignment`: provider-supplied per-character timing tables
 * - `timing`: the three timing strategies (uniform, alignment, per-clip)
 * - `reconcile`: trim/loop planning for video vs narration duration
 * - `schedule`: the final ordered caption schedule
 */

// Re-export main types for easier usage
pub use self::alignment::AlignmentTable;
pub use self::reconcile::{plan_reconciliation, ReconcilePlan, DURATION_TOLERANCE_SECONDS};
pub use self::schedule::{build_schedule, CaptionEvent, CaptionPosition, CaptionSchedule};
pub use self::timing::{compute_timings, TimingEntry, TimingSource, MIN_CAPTION_SECONDS};

// Submodules
pub mod alignment;
pub mod reconcile;
pub mod schedule;
pub mod timing;
