/*!
 * Tests for the provider alignment table
 */

use storysync::errors::AppError;
use storysync::sync::alignment::AlignmentTable;

fn timed(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

/// Test that mismatched array lengths are rejected at construction
#[test]
fn test_new_withMismatchedArrayLengths_shouldFailWithAlignmentMismatch() {
    let characters: Vec<char> = "abc".chars().collect();

    let result = AlignmentTable::new(characters.clone(), timed(&[0.0, 0.1]), timed(&[0.1, 0.2, 0.3]));
    assert!(matches!(result, Err(AppError::AlignmentMismatch(_))));

    let result = AlignmentTable::new(characters, timed(&[0.0, 0.1, 0.2]), timed(&[0.1]));
    assert!(matches!(result, Err(AppError::AlignmentMismatch(_))));
}

/// Test spoken text reconstruction from the character array
#[test]
fn test_spoken_text_withValidTable_shouldReconstructCharacters() {
    let characters: Vec<char> = "Hi there.".chars().collect();
    let count = characters.len();
    let table = AlignmentTable::new(
        characters,
        vec![None; count],
        vec![None; count],
    )
    .unwrap();

    assert_eq!(table.spoken_text(), "Hi there.");
    assert_eq!(table.len(), count);
    assert!(!table.is_empty());
}

/// Test span projection over timed characters
#[test]
fn test_project_span_withTimedCharacters_shouldReturnMinStartMaxEnd() {
    let characters: Vec<char> = "abc".chars().collect();
    let table = AlignmentTable::new(
        characters,
        timed(&[0.5, 0.2, 0.9]),
        timed(&[0.6, 0.3, 1.1]),
    )
    .unwrap();

    let (start, end) = table.project_span(&(0..3)).unwrap().unwrap();
    assert!((start - 0.2).abs() < 1e-9);
    assert!((end - 1.1).abs() < 1e-9);
}

/// Test that whitespace characters never contribute timing
#[test]
fn test_project_span_withOnlyWhitespaceTimed_shouldReturnNone() {
    let characters: Vec<char> = "a b".chars().collect();
    // Only the space carries times; both letters are untimed
    let table = AlignmentTable::new(
        characters,
        vec![None, Some(0.1), None],
        vec![None, Some(0.2), None],
    )
    .unwrap();

    assert!(table.project_span(&(0..3)).unwrap().is_none());
}

/// Test that adjacent half-open spans never share a character
#[test]
fn test_project_span_withAdjacentSpans_shouldAttributeBoundaryToEarlierSpan() {
    let characters: Vec<char> = "ab".chars().collect();
    let table = AlignmentTable::new(
        characters,
        timed(&[0.0, 1.0]),
        timed(&[0.5, 1.5]),
    )
    .unwrap();

    // The boundary index 1 belongs to the second span only
    let (_, first_end) = table.project_span(&(0..1)).unwrap().unwrap();
    let (second_start, _) = table.project_span(&(1..2)).unwrap().unwrap();
    assert!((first_end - 0.5).abs() < 1e-9);
    assert!((second_start - 1.0).abs() < 1e-9);
}

/// Test that spans past the end of the table are rejected
#[test]
fn test_project_span_withOutOfRangeSpan_shouldFailWithAlignmentMismatch() {
    let characters: Vec<char> = "ab".chars().collect();
    let table = AlignmentTable::new(characters, timed(&[0.0, 0.1]), timed(&[0.1, 0.2])).unwrap();

    let result = table.project_span(&(0..3));
    assert!(matches!(result, Err(AppError::AlignmentMismatch(_))));
}
