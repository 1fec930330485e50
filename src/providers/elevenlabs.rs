use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{AlignedSpeech, SpeechClip, SpeechProvider};

/// ElevenLabs client for interacting with the ElevenLabs TTS API
#[derive(Debug)]
pub struct ElevenLabs {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
    /// Model identifier sent with every synthesis request
    model: String,
}

/// Voice rendering parameters
#[derive(Debug, Serialize)]
pub struct VoiceSettings {
    /// Voice stability
    stability: f32,

    /// Similarity boost
    similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.7,
            similarity_boost: 0.7,
        }
    }
}

/// ElevenLabs synthesis request body
#[derive(Debug, Serialize)]
pub struct SynthesisRequest {
    /// The text to speak
    text: String,

    /// Model to synthesize with
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<String>,

    /// Voice rendering parameters
    voice_settings: VoiceSettings,
}

impl SynthesisRequest {
    /// Create a new synthesis request
    pub fn new(text: impl Into<String>, model_id: impl Into<String>) -> Self {
        let model_id = model_id.into();
        Self {
            text: text.into(),
            model_id: if model_id.is_empty() { None } else { Some(model_id) },
            voice_settings: VoiceSettings::default(),
        }
    }
}

/// Response body of the with-timestamps endpoint
#[derive(Debug, Deserialize)]
struct TimestampedResponse {
    /// Base64-encoded audio
    audio_base64: Option<String>,

    /// Character timing over the literal input text
    alignment: Option<RawAlignment>,

    /// Character timing over the text as normalized by the provider
    normalized_alignment: Option<RawAlignment>,
}

/// Raw parallel timing arrays as they appear on the wire
#[derive(Debug, Deserialize)]
struct RawAlignment {
    characters: Vec<String>,
    character_start_times_seconds: Vec<Option<f64>>,
    character_end_times_seconds: Vec<Option<f64>>,
}

impl ElevenLabs {
    /// Create a new ElevenLabs client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    fn base_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.elevenlabs.io".to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }

    async fn post_synthesis(
        &self,
        url: &str,
        accept: &str,
        text: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        let request = SynthesisRequest::new(text, self.model.clone());

        let response = self
            .client
            .post(url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", accept)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to send request to ElevenLabs API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("ElevenLabs API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text.chars().take(300).collect(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabs {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<SpeechClip, ProviderError> {
        let url = format!(
            "{}/v1/text-to-speech/{}?optimize_streaming_latency=0",
            self.base_url(),
            voice
        );

        let response = self.post_synthesis(&url, "audio/mpeg", text).await?;
        let audio = response
            .bytes()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to read audio body: {}", e)))?;

        if audio.is_empty() {
            return Err(ProviderError::MissingAudio(
                "ElevenLabs returned an empty audio body".to_string(),
            ));
        }

        Ok(SpeechClip { audio })
    }

    async fn synthesize_with_alignment(
        &self,
        text: &str,
        voice: &str,
    ) -> Result<AlignedSpeech, ProviderError> {
        let url = format!(
            "{}/v1/text-to-speech/{}/with-timestamps",
            self.base_url(),
            voice
        );

        let response = self.post_synthesis(&url, "application/json", text).await?;
        let payload = response
            .json::<TimestampedResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse ElevenLabs timestamp response: {}", e)))?;

        let audio_base64 = payload.audio_base64.ok_or_else(|| {
            ProviderError::MissingAudio("Timestamp response did not include audio_base64".to_string())
        })?;
        let audio = STANDARD
            .decode(audio_base64.as_bytes())
            .map_err(|e| ProviderError::ParseError(format!("Invalid base64 audio payload: {}", e)))?;

        // Prefer the normalized table; it covers the text as actually spoken
        let raw = payload
            .normalized_alignment
            .or(payload.alignment)
            .ok_or_else(|| {
                ProviderError::ParseError(
                    "Timestamp response did not include an alignment payload".to_string(),
                )
            })?;

        // The API sends one-character strings
        let characters = raw
            .characters
            .iter()
            .map(|s| s.chars().next().unwrap_or(' '))
            .collect();

        Ok(AlignedSpeech {
            audio: Bytes::from(audio),
            characters,
            start_times: raw.character_start_times_seconds,
            end_times: raw.character_end_times_seconds,
        })
    }

    fn supports_alignment(&self) -> bool {
        true
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/v1/voices", self.base_url());

        let response = self
            .client
            .get(&url)
            .header("xi-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to reach ElevenLabs API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: "Voice listing request failed".to_string(),
            });
        }

        Ok(())
    }
}
