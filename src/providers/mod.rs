/*!
 * Provider implementations for speech synthesis services.
 *
 * This module contains client implementations for the supported TTS
 * providers:
 * - ElevenLabs: hosted voices, optionally with per-character timing
 * - OpenAI: hosted voices, audio only
 * - Mock: deterministic provider for tests
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Synthesized speech audio returned by a provider
#[derive(Debug, Clone)]
pub struct SpeechClip {
    /// Encoded audio bytes (mp3 unless the provider says otherwise)
    pub audio: Bytes,
}

/// Synthesized speech audio plus the raw per-character timing arrays.
///
/// The arrays are carried unvalidated; the pipeline promotes them into an
/// `AlignmentTable`, which is where the equal-length invariant is enforced.
#[derive(Debug, Clone)]
pub struct AlignedSpeech {
    /// Encoded audio bytes
    pub audio: Bytes,

    /// Characters of the text the provider actually spoke
    pub characters: Vec<char>,

    /// Nullable start time per character, in seconds
    pub start_times: Vec<Option<f64>>,

    /// Nullable end time per character, in seconds
    pub end_times: Vec<Option<f64>>,
}

/// Common trait for all speech synthesis providers
///
/// This trait defines the interface that all provider implementations must
/// follow, allowing them to be used interchangeably in the pipeline.
#[async_trait]
pub trait SpeechProvider: Send + Sync + Debug {
    /// Synthesize narration audio for the given text
    ///
    /// # Arguments
    /// * `text` - The text to speak
    /// * `voice` - Provider-specific voice identifier
    ///
    /// # Returns
    /// * `Result<SpeechClip, ProviderError>` - The synthesized audio or an error
    async fn synthesize(&self, text: &str, voice: &str) -> Result<SpeechClip, ProviderError>;

    /// Synthesize narration audio together with per-character timing
    ///
    /// Providers that cannot report timing return a `RequestFailed` error;
    /// callers should check `supports_alignment` before choosing the
    /// alignment timing strategy.
    async fn synthesize_with_alignment(
        &self,
        text: &str,
        voice: &str,
    ) -> Result<AlignedSpeech, ProviderError>;

    /// Whether this provider can return a character alignment payload
    fn supports_alignment(&self) -> bool;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod elevenlabs;
pub mod mock;
pub mod openai;
