use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{AlignedSpeech, SpeechClip, SpeechProvider};

/// OpenAI client for the speech synthesis endpoint
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, for Azure OpenAI or self-hosted)
    endpoint: String,
    /// Model to synthesize with
    model: String,
}

/// OpenAI speech request body
#[derive(Debug, Serialize)]
pub struct SpeechRequest {
    /// The model to use
    model: String,

    /// The text to speak
    input: String,

    /// Voice preset name
    voice: String,

    /// Output container format
    response_format: String,
}

impl OpenAI {
    /// Create a new OpenAI client
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
            "https://api.openai.com/v1".to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }
}

#[async_trait]
impl SpeechProvider for OpenAI {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<SpeechClip, ProviderError> {
        let url = format!("{}/audio/speech", self.base_url());
        let request = SpeechRequest {
            model: self.model.clone(),
            input: text.to_string(),
            voice: voice.to_string(),
            response_format: "mp3".to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to send request to OpenAI API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text.chars().take(300).collect(),
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to read audio body: {}", e)))?;

        if audio.is_empty() {
            return Err(ProviderError::MissingAudio(
                "OpenAI returned an empty audio body".to_string(),
            ));
        }

        Ok(SpeechClip { audio })
    }

    async fn synthesize_with_alignment(
        &self,
        _text: &str,
        _voice: &str,
    ) -> Result<AlignedSpeech, ProviderError> {
        Err(ProviderError::RequestFailed(
            "OpenAI speech synthesis does not report character timing".to_string(),
        ))
    }

    fn supports_alignment(&self) -> bool {
        false
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/models", self.base_url());

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to reach OpenAI API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: "Model listing request failed".to_string(),
            });
        }

        Ok(())
    }
}
