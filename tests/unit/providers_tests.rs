/*!
 * Tests for provider implementations
 */

use storysync::errors::ProviderError;
use storysync::providers::elevenlabs::ElevenLabs;
use storysync::providers::mock::{MockSpeechProvider, MOCK_SECONDS_PER_CHAR};
use storysync::providers::openai::OpenAI;
use storysync::providers::SpeechProvider;
use storysync::sync::alignment::AlignmentTable;

/// Test the working mock returns audio and counts requests
#[tokio::test]
async fn test_mock_working_shouldReturnAudioAndCountRequests() {
    let provider = MockSpeechProvider::working();

    let clip = provider.synthesize("Hello there", "narrator").await.unwrap();
    assert!(!clip.audio.is_empty());

    provider.synthesize("Again", "narrator").await.unwrap();
    assert_eq!(provider.request_count(), 2);
}

/// Test the failing mock surfaces an API error
#[tokio::test]
async fn test_mock_failing_shouldReturnApiError() {
    let provider = MockSpeechProvider::failing();

    let result = provider.synthesize("Hello", "narrator").await;
    assert!(matches!(
        result,
        Err(ProviderError::ApiError { status_code: 500, .. })
    ));

    assert!(provider.test_connection().await.is_err());
}

/// Test the mock alignment payload has parallel arrays and whitespace gaps
#[tokio::test]
async fn test_mock_alignment_shouldProduceParallelTimedArrays() {
    let provider = MockSpeechProvider::working();

    let aligned = provider
        .synthesize_with_alignment("ab cd", "narrator")
        .await
        .unwrap();

    assert_eq!(aligned.characters.len(), 5);
    assert_eq!(aligned.start_times.len(), 5);
    assert_eq!(aligned.end_times.len(), 5);

    // Whitespace carries no timing, letters are timed at a fixed rate
    assert!(aligned.start_times[2].is_none());
    assert!((aligned.start_times[0].unwrap() - 0.0).abs() < 1e-9);
    assert!((aligned.end_times[4].unwrap() - 5.0 * MOCK_SECONDS_PER_CHAR).abs() < 1e-9);

    // The payload promotes cleanly into a validated table
    let table =
        AlignmentTable::new(aligned.characters, aligned.start_times, aligned.end_times).unwrap();
    assert_eq!(table.spoken_text(), "ab cd");
}

/// Test the untimed mock yields a table with no projectable spans
#[tokio::test]
async fn test_mock_untimed_shouldYieldNoUsableTiming() {
    let provider = MockSpeechProvider::untimed();

    let aligned = provider
        .synthesize_with_alignment("abc", "narrator")
        .await
        .unwrap();
    let table =
        AlignmentTable::new(aligned.characters, aligned.start_times, aligned.end_times).unwrap();

    assert!(table.project_span(&(0..3)).unwrap().is_none());
}

/// Test alignment capability flags on the real clients
#[test]
fn test_alignment_support_shouldMatchProviderCapabilities() {
    let elevenlabs = ElevenLabs::new("key", "", "eleven_multilingual_v2");
    let openai = OpenAI::new("key", "", "tts-1");
    let mock = MockSpeechProvider::working();

    assert!(elevenlabs.supports_alignment());
    assert!(!openai.supports_alignment());
    assert!(mock.supports_alignment());
}

/// Test that the OpenAI client refuses alignment requests outright
#[test]
fn test_openai_synthesize_with_alignment_shouldFailFast() {
    let openai = OpenAI::new("key", "", "tts-1");

    let result = tokio_test::block_on(openai.synthesize_with_alignment("Hello", "alloy"));
    assert!(matches!(result, Err(ProviderError::RequestFailed(_))));
}
