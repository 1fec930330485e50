use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::segmenter::{SegmentPolicy, DEFAULT_SENTENCE_CHAR_CAP, DEFAULT_WORDS_PER_CAPTION};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Speech synthesis config
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Transcript segmentation config
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Caption timing strategy
    #[serde(default)]
    pub timing_strategy: TimingStrategy,

    /// Render config
    #[serde(default)]
    pub render: RenderConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech synthesis provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechProviderKind {
    // @provider: ElevenLabs
    #[default]
    ElevenLabs,
    // @provider: OpenAI
    OpenAI,
}

impl SpeechProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::ElevenLabs => "ElevenLabs",
            Self::OpenAI => "OpenAI",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::ElevenLabs => "elevenlabs".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }
}

// Implement Display trait for SpeechProviderKind
impl std::fmt::Display for SpeechProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for SpeechProviderKind
impl std::str::FromStr for SpeechProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "elevenlabs" => Ok(Self::ElevenLabs),
            "openai" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Strategy used to derive caption timing
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimingStrategy {
    // @strategy: one narration call, duration divided evenly across units
    Uniform,
    // @strategy: one narration call plus a character timing payload
    Alignment,
    // @strategy: one synthesis call per caption unit, laid back-to-back
    #[default]
    #[serde(rename = "per-clip")]
    PerClip,
}

impl TimingStrategy {
    // @returns: Lowercase strategy identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Uniform => "uniform".to_string(),
            Self::Alignment => "alignment".to_string(),
            Self::PerClip => "per-clip".to_string(),
        }
    }
}

impl std::fmt::Display for TimingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TimingStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "alignment" => Ok(Self::Alignment),
            "per-clip" | "perclip" => Ok(Self::PerClip),
            _ => Err(anyhow!("Invalid timing strategy: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Default voice identifier
    #[serde(default = "String::new")]
    pub voice: String,

    // @field: Max concurrent synthesis requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: SpeechProviderKind) -> Self {
        match provider_type {
            SpeechProviderKind::ElevenLabs => Self {
                provider_type: "elevenlabs".to_string(),
                model: default_elevenlabs_model(),
                api_key: String::new(),
                endpoint: default_elevenlabs_endpoint(),
                voice: String::new(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_timeout_secs(),
            },
            SpeechProviderKind::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                voice: default_openai_voice(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    /// Active provider
    #[serde(default)]
    pub provider: SpeechProviderKind,

    /// Available provider configurations
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,
}

impl SpeechConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get a specific provider configuration by type for testing
    pub fn get_provider_config(&self, provider_type: &SpeechProviderKind) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            SpeechProviderKind::ElevenLabs => default_elevenlabs_model(),
            SpeechProviderKind::OpenAI => default_openai_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            SpeechProviderKind::ElevenLabs => default_elevenlabs_endpoint(),
            SpeechProviderKind::OpenAI => default_openai_endpoint(),
        }
    }

    /// Get the default voice for the active provider
    pub fn get_voice(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.voice.is_empty() {
                return provider_config.voice.clone();
            }
        }

        match self.provider {
            SpeechProviderKind::ElevenLabs => String::new(),
            SpeechProviderKind::OpenAI => default_openai_voice(),
        }
    }

    /// Get the concurrent request budget for the active provider
    pub fn optimal_concurrent_requests(&self) -> usize {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.concurrent_requests;
        }

        // Default fallback
        default_concurrent_requests()
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: SpeechProviderKind::default(),
            available_providers: Vec::new(),
        };

        // Add default providers
        config
            .available_providers
            .push(ProviderConfig::new(SpeechProviderKind::ElevenLabs));
        config
            .available_providers
            .push(ProviderConfig::new(SpeechProviderKind::OpenAI));

        config
    }
}

/// Segmentation policy selector
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SegmentPolicyKind {
    /// Fixed word-count chunks
    Words,
    /// Sentence spans with comma re-splitting
    #[default]
    Sentences,
}

impl std::str::FromStr for SegmentPolicyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "words" => Ok(Self::Words),
            "sentences" => Ok(Self::Sentences),
            _ => Err(anyhow!("Invalid segmentation policy: {}", s)),
        }
    }
}

/// Transcript segmentation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SegmentationConfig {
    /// Which policy to segment with
    #[serde(default)]
    pub policy: SegmentPolicyKind,

    /// Words per caption for the word-count policy
    #[serde(default = "default_words_per_caption")]
    pub words_per_caption: usize,

    /// Character cap for the sentence policy
    #[serde(default = "default_sentence_char_cap")]
    pub sentence_char_cap: usize,
}

impl SegmentationConfig {
    /// Materialize the configured segmentation policy
    pub fn to_policy(&self) -> SegmentPolicy {
        match self.policy {
            SegmentPolicyKind::Words => SegmentPolicy::WordCount {
                max_words: self.words_per_caption,
            },
            SegmentPolicyKind::Sentences => SegmentPolicy::Sentence {
                max_chars: self.sentence_char_cap,
            },
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            policy: SegmentPolicyKind::default(),
            words_per_caption: default_words_per_caption(),
            sentence_char_cap: default_sentence_char_cap(),
        }
    }
}

/// Render configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    /// Force 9:16 vertical output (scale to height, center-crop)
    #[serde(default)]
    pub vertical_format: bool,

    /// Target width for the vertical crop
    #[serde(default = "default_vertical_width")]
    pub vertical_width: u32,

    /// Target height for the vertical crop
    #[serde(default = "default_vertical_height")]
    pub vertical_height: u32,

    /// Vertical caption offset in pixels, positive moves down
    #[serde(default)]
    pub caption_y_offset: i32,

    /// Caption font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vertical_format: false,
            vertical_width: default_vertical_width(),
            vertical_height: default_vertical_height(),
            caption_y_offset: 0,
            font_size: default_font_size(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_words_per_caption() -> usize {
    DEFAULT_WORDS_PER_CAPTION
}

fn default_sentence_char_cap() -> usize {
    DEFAULT_SENTENCE_CHAR_CAP
}

fn default_vertical_width() -> u32 {
    1080
}

fn default_vertical_height() -> u32 {
    1920
}

fn default_font_size() -> u32 {
    60
}

fn default_elevenlabs_endpoint() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_elevenlabs_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_openai_model() -> String {
    "tts-1".to_string()
}

fn default_openai_voice() -> String {
    "alloy".to_string()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| anyhow!("Failed to open config file {:?}: {}", path.as_ref(), e))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path.as_ref(), e))?;
        Ok(config)
    }

    /// Write configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| anyhow!("Failed to write config file {:?}: {}", path.as_ref(), e))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Both hosted providers require an API key
        let api_key = self.speech.get_api_key();
        if api_key.is_empty() {
            return Err(anyhow!(
                "Speech API key is required for {} provider",
                self.speech.provider.display_name()
            ));
        }

        // The alignment strategy only works with a provider that reports timing
        if self.timing_strategy == TimingStrategy::Alignment
            && self.speech.provider == SpeechProviderKind::OpenAI
        {
            return Err(anyhow!(
                "The alignment timing strategy requires a provider with character timing support"
            ));
        }

        // Endpoint URLs must parse before any client gets built around them
        for provider in &self.speech.available_providers {
            if !provider.endpoint.is_empty() {
                Url::parse(&provider.endpoint).map_err(|e| {
                    anyhow!("Invalid endpoint for {} provider: {}", provider.provider_type, e)
                })?;
            }
        }

        if self.segmentation.words_per_caption == 0 {
            return Err(anyhow!("words_per_caption must be at least 1"));
        }
        if self.segmentation.sentence_char_cap == 0 {
            return Err(anyhow!("sentence_char_cap must be at least 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            speech: SpeechConfig::default(),
            segmentation: SegmentationConfig::default(),
            timing_strategy: TimingStrategy::default(),
            render: RenderConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
