/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockSpeechProvider::working()` - Always succeeds with audio bytes
 * - `MockSpeechProvider::failing()` - Always fails with an API error
 * - `MockSpeechProvider::untimed()` - Succeeds, but the alignment payload
 *   carries no character times at all
 * - `MockSpeechProvider::slow(ms)` - Succeeds after a delay
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{AlignedSpeech, SpeechClip, SpeechProvider};

/// Seconds of synthetic speech assigned to each character by the mock
pub const MOCK_SECONDS_PER_CHAR: f64 = 0.1;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with audio and fully timed alignment
    Working,
    /// Always fails with an API error
    Failing,
    /// Succeeds, but every alignment time is null
    Untimed,
    /// Simulates slow responses (for timeout testing)
    Slow {
        /// Delay before answering
        delay_ms: u64,
    },
}

/// Mock provider for testing pipeline behavior
#[derive(Debug)]
pub struct MockSpeechProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter across both synthesis methods
    request_count: Arc<AtomicUsize>,
}

impl MockSpeechProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose alignment payload has no usable times
    pub fn untimed() -> Self {
        Self::new(MockBehavior::Untimed)
    }

    /// Create a mock that answers after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of synthesis requests served so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    async fn gate(&self) -> Result<(), ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "mock provider configured to fail".to_string(),
            }),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    async fn synthesize(&self, _text: &str, _voice: &str) -> Result<SpeechClip, ProviderError> {
        self.gate().await?;
        Ok(SpeechClip {
            audio: Bytes::from_static(b"ID3mock-audio-frame"),
        })
    }

    async fn synthesize_with_alignment(
        &self,
        text: &str,
        _voice: &str,
    ) -> Result<AlignedSpeech, ProviderError> {
        self.gate().await?;

        let characters: Vec<char> = text.chars().collect();
        let mut start_times = Vec::with_capacity(characters.len());
        let mut end_times = Vec::with_capacity(characters.len());

        for (i, ch) in characters.iter().enumerate() {
            // Whitespace gets no timing, mirroring real payloads that omit
            // silence; Untimed mode omits timing everywhere
            if self.behavior == MockBehavior::Untimed || ch.is_whitespace() {
                start_times.push(None);
                end_times.push(None);
            } else {
                start_times.push(Some(i as f64 * MOCK_SECONDS_PER_CHAR));
                end_times.push(Some((i + 1) as f64 * MOCK_SECONDS_PER_CHAR));
            }
        }

        Ok(AlignedSpeech {
            audio: Bytes::from_static(b"ID3mock-audio-frame"),
            characters,
            start_times,
            end_times,
        })
    }

    fn supports_alignment(&self) -> bool {
        true
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::RequestFailed(
                "mock provider configured to fail".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
