/*!
 * Tests for the caption timing strategies
 */

use storysync::errors::AppError;
use storysync::segmenter::CaptionUnit;
use storysync::sync::alignment::AlignmentTable;
use storysync::sync::timing::{compute_timings, TimingSource, MIN_CAPTION_SECONDS};

/// Build a unit without a span
fn unit(text: &str) -> CaptionUnit {
    CaptionUnit {
        text: text.to_string(),
        source_span: None,
    }
}

/// Build a unit with a character span
fn spanned_unit(text: &str, start: usize, end: usize) -> CaptionUnit {
    CaptionUnit {
        text: text.to_string(),
        source_span: Some(start..end),
    }
}

/// Test the uniform strategy on the canonical example
#[test]
fn test_uniform_withFiveUnitsOverTenSeconds_shouldSpreadEvenly() {
    let units: Vec<CaptionUnit> = (0..5).map(|i| unit(&format!("u{}", i))).collect();
    let entries = compute_timings(&units, &TimingSource::Uniform { total_seconds: 10.0 }).unwrap();

    assert_eq!(entries.len(), 5);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.unit_index, i);
        assert!((entry.duration_seconds - 2.0).abs() < 1e-9);
        assert!((entry.start_seconds - (i as f64 * 2.0)).abs() < 1e-9);
    }
}

/// Test that an empty unit sequence is rejected
#[test]
fn test_uniform_withNoUnits_shouldFailWithInvalidInput() {
    let result = compute_timings(&[], &TimingSource::Uniform { total_seconds: 10.0 });
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

/// Test that a non-positive narration duration is rejected
#[test]
fn test_uniform_withZeroDuration_shouldFailWithInvalidInput() {
    let units = vec![unit("a")];
    let result = compute_timings(&units, &TimingSource::Uniform { total_seconds: 0.0 });
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

/// Test the per-clip strategy on the canonical example
#[test]
fn test_per_clip_withMeasuredDurations_shouldLayOutBackToBack() {
    let units = vec![unit("a"), unit("b"), unit("c")];
    let entries = compute_timings(
        &units,
        &TimingSource::PerClip {
            clip_seconds: vec![1.5, 2.0, 0.5],
        },
    )
    .unwrap();

    let starts: Vec<f64> = entries.iter().map(|e| e.start_seconds).collect();
    assert_eq!(starts, vec![0.0, 1.5, 3.5]);

    let total: f64 = entries.iter().map(|e| e.duration_seconds).sum();
    assert!((total - 4.0).abs() < 1e-9);

    // Back-to-back, no gaps and no overlaps
    for pair in entries.windows(2) {
        let end = pair[0].start_seconds + pair[0].duration_seconds;
        assert!((end - pair[1].start_seconds).abs() < 1e-9);
    }
}

/// Test that a clip count mismatch is rejected
#[test]
fn test_per_clip_withMismatchedClipCount_shouldFailWithInvalidInput() {
    let units = vec![unit("a"), unit("b")];
    let result = compute_timings(
        &units,
        &TimingSource::PerClip {
            clip_seconds: vec![1.0],
        },
    );
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

/// Test that degenerate clip durations are clamped to the floor
#[test]
fn test_per_clip_withZeroLengthClip_shouldClampToFloor() {
    let units = vec![unit("a"), unit("b")];
    let entries = compute_timings(
        &units,
        &TimingSource::PerClip {
            clip_seconds: vec![0.0, 1.0],
        },
    )
    .unwrap();

    assert!((entries[0].duration_seconds - MIN_CAPTION_SECONDS).abs() < 1e-9);
    assert!((entries[1].start_seconds - MIN_CAPTION_SECONDS).abs() < 1e-9);
}

/// Test the alignment strategy over a fully timed table
#[test]
fn test_alignment_withTimedSpans_shouldProjectStartAndEnd() {
    // "ab cd": every letter timed at 0.1s per character, the space untimed
    let characters: Vec<char> = "ab cd".chars().collect();
    let start_times = vec![Some(0.0), Some(0.1), None, Some(0.3), Some(0.4)];
    let end_times = vec![Some(0.1), Some(0.2), None, Some(0.4), Some(0.5)];
    let table = AlignmentTable::new(characters, start_times, end_times).unwrap();

    let units = vec![spanned_unit("ab", 0, 2), spanned_unit("cd", 3, 5)];
    let entries = compute_timings(&units, &TimingSource::Alignment { table }).unwrap();

    assert_eq!(entries.len(), 2);
    assert!((entries[0].start_seconds - 0.0).abs() < 1e-9);
    assert!((entries[0].duration_seconds - 0.2).abs() < 1e-9);
    assert!((entries[1].start_seconds - 0.3).abs() < 1e-9);
    assert!((entries[1].duration_seconds - 0.2).abs() < 1e-9);
}

/// Test that units without usable timing are dropped, not fatal
#[test]
fn test_alignment_withUntimedSpan_shouldDropExactlyThatUnit() {
    // Second unit's characters carry no timing at all
    let characters: Vec<char> = "ab cd".chars().collect();
    let start_times = vec![Some(0.0), Some(0.1), None, None, None];
    let end_times = vec![Some(0.1), Some(0.2), None, None, None];
    let table = AlignmentTable::new(characters, start_times, end_times).unwrap();

    let units = vec![spanned_unit("ab", 0, 2), spanned_unit("cd", 3, 5)];
    let entries = compute_timings(&units, &TimingSource::Alignment { table }).unwrap();

    // Schedule is shorter than the unit count by exactly the dropped units
    assert_eq!(entries.len(), units.len() - 1);
    assert_eq!(entries[0].unit_index, 0);
}

/// Test that negative provider start times are clamped to zero
#[test]
fn test_alignment_withNegativeStartTime_shouldClampToZero() {
    let characters: Vec<char> = "a".chars().collect();
    let table = AlignmentTable::new(characters, vec![Some(-0.25)], vec![Some(0.4)]).unwrap();

    let units = vec![spanned_unit("a", 0, 1)];
    let entries = compute_timings(&units, &TimingSource::Alignment { table }).unwrap();

    assert!((entries[0].start_seconds - 0.0).abs() < 1e-9);
    assert!((entries[0].duration_seconds - 0.4).abs() < 1e-9);
}

/// Test that a unit without a span cannot be aligned
#[test]
fn test_alignment_withMissingSpan_shouldFailWithInvalidInput() {
    let characters: Vec<char> = "a".chars().collect();
    let table = AlignmentTable::new(characters, vec![Some(0.0)], vec![Some(0.1)]).unwrap();

    let units = vec![unit("a")];
    let result = compute_timings(&units, &TimingSource::Alignment { table });
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

/// Test that no strategy ever produces overlapping windows
#[test]
fn test_timings_withEitherDeterministicStrategy_shouldNeverOverlap() {
    let units: Vec<CaptionUnit> = (0..7).map(|i| unit(&format!("u{}", i))).collect();

    let uniform = compute_timings(&units, &TimingSource::Uniform { total_seconds: 3.5 }).unwrap();
    let per_clip = compute_timings(
        &units,
        &TimingSource::PerClip {
            clip_seconds: vec![0.4, 0.9, 0.1, 2.0, 0.3, 0.7, 1.1],
        },
    )
    .unwrap();

    for entries in [uniform, per_clip] {
        for pair in entries.windows(2) {
            let end = pair[0].start_seconds + pair[0].duration_seconds;
            assert!(end <= pair[1].start_seconds + 1e-9);
        }
    }
}
