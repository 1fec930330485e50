/*!
 * Tests for app configuration functionality
 */

use std::str::FromStr;
use anyhow::Result;
use storysync::app_config::{
    Config, SegmentPolicyKind, SpeechProviderKind, TimingStrategy,
};
use storysync::segmenter::SegmentPolicy;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_shouldUseExpectedDefaults() {
    let config = Config::default();

    assert_eq!(config.speech.provider, SpeechProviderKind::ElevenLabs);
    assert_eq!(config.timing_strategy, TimingStrategy::PerClip);
    assert_eq!(config.segmentation.policy, SegmentPolicyKind::Sentences);
    assert_eq!(config.segmentation.words_per_caption, 4);
    assert_eq!(config.segmentation.sentence_char_cap, 220);
    assert!(!config.render.vertical_format);
    assert_eq!(config.render.vertical_width, 1080);
    assert_eq!(config.render.vertical_height, 1920);
    assert_eq!(config.render.font_size, 60);

    // Both providers get a default block
    assert!(config
        .speech
        .get_provider_config(&SpeechProviderKind::ElevenLabs)
        .is_some());
    assert!(config
        .speech
        .get_provider_config(&SpeechProviderKind::OpenAI)
        .is_some());
}

/// Test provider accessor fallbacks
#[test]
fn test_speech_config_accessors_shouldFallBackToProviderDefaults() {
    let config = Config::default();

    assert_eq!(config.speech.get_endpoint(), "https://api.elevenlabs.io");
    assert_eq!(config.speech.get_model(), "eleven_multilingual_v2");
    assert!(config.speech.get_api_key().is_empty());
    assert_eq!(config.speech.optimal_concurrent_requests(), 4);

    let mut config = config;
    config.speech.provider = SpeechProviderKind::OpenAI;
    assert_eq!(config.speech.get_endpoint(), "https://api.openai.com/v1");
    assert_eq!(config.speech.get_model(), "tts-1");
    assert_eq!(config.speech.get_voice(), "alloy");
}

/// Test configuration file round-trip
#[test]
fn test_config_file_roundTrip_shouldPreserveValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config_path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.timing_strategy = TimingStrategy::Uniform;
    config.render.vertical_format = true;
    config.render.caption_y_offset = -120;
    config.save_to_file(&config_path)?;

    let loaded = Config::from_file(&config_path)?;
    assert_eq!(loaded.timing_strategy, TimingStrategy::Uniform);
    assert!(loaded.render.vertical_format);
    assert_eq!(loaded.render.caption_y_offset, -120);

    Ok(())
}

/// Test provider parsing from strings
#[test]
fn test_provider_from_str_shouldAcceptKnownNames() {
    assert_eq!(
        SpeechProviderKind::from_str("elevenlabs").unwrap(),
        SpeechProviderKind::ElevenLabs
    );
    assert_eq!(
        SpeechProviderKind::from_str("OpenAI").unwrap(),
        SpeechProviderKind::OpenAI
    );
    assert!(SpeechProviderKind::from_str("espeak").is_err());
}

/// Test timing strategy parsing from strings
#[test]
fn test_strategy_from_str_shouldAcceptKnownNames() {
    assert_eq!(TimingStrategy::from_str("uniform").unwrap(), TimingStrategy::Uniform);
    assert_eq!(TimingStrategy::from_str("alignment").unwrap(), TimingStrategy::Alignment);
    assert_eq!(TimingStrategy::from_str("per-clip").unwrap(), TimingStrategy::PerClip);
    assert_eq!(TimingStrategy::from_str("perclip").unwrap(), TimingStrategy::PerClip);
    assert!(TimingStrategy::from_str("karaoke").is_err());
}

/// Test validation rejects a missing API key
#[test]
fn test_validate_withMissingApiKey_shouldFail() {
    let config = Config::default();
    assert!(config.validate().is_err());
}

/// Test validation accepts a configured key
#[test]
fn test_validate_withApiKey_shouldSucceed() {
    let mut config = Config::default();
    for provider in config.speech.available_providers.iter_mut() {
        provider.api_key = "test-key".to_string();
    }
    assert!(config.validate().is_ok());
}

/// Test validation rejects alignment timing on a provider without timing
#[test]
fn test_validate_withAlignmentOnOpenAi_shouldFail() {
    let mut config = Config::default();
    for provider in config.speech.available_providers.iter_mut() {
        provider.api_key = "test-key".to_string();
    }
    config.speech.provider = SpeechProviderKind::OpenAI;
    config.timing_strategy = TimingStrategy::Alignment;

    assert!(config.validate().is_err());
}

/// Test segmentation config materializes the right policy
#[test]
fn test_segmentation_to_policy_shouldMapKindAndParameters() {
    let mut config = Config::default();

    config.segmentation.policy = SegmentPolicyKind::Words;
    config.segmentation.words_per_caption = 6;
    assert_eq!(
        config.segmentation.to_policy(),
        SegmentPolicy::WordCount { max_words: 6 }
    );

    config.segmentation.policy = SegmentPolicyKind::Sentences;
    config.segmentation.sentence_char_cap = 100;
    assert_eq!(
        config.segmentation.to_policy(),
        SegmentPolicy::Sentence { max_chars: 100 }
    );
}
