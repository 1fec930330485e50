/*!
 * Error types for the storysync application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to a speech synthesis provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Response arrived without the audio payload
    #[error("Response did not contain audio data: {0}")]
    MissingAudio(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid caller input: empty transcript, unreadable files, missing voice,
    /// or a video too short to loop against
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a speech provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Alignment payload arrays disagree in length, or the payload carries
    /// no usable timing data at all
    #[error("Alignment mismatch: {0}")]
    AlignmentMismatch(String),

    /// Error probing or transforming media
    #[error("Media error: {0}")]
    Media(String),

    /// The compositor rejected the assembled render request
    #[error("Render failed: {0}")]
    Render(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
