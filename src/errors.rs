/*!
 * Error types for the docorrect application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when working with correction backends
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
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication; never retried, aborts the whole run
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The backend refused to process the text for content-policy reasons
    #[error("Content blocked by backend: {0}")]
    ContentBlocked(String),

    /// The backend returned an empty or unusable response
    #[error("Empty response from backend")]
    EmptyResponse,
}

impl ProviderError {
    /// Whether a retry can possibly succeed for this error
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::AuthenticationError(_) | Self::ContentBlocked(_) => false,
            Self::RequestFailed(_)
            | Self::ParseError(_)
            | Self::ApiError { .. }
            | Self::ConnectionError(_)
            | Self::RateLimitExceeded(_)
            | Self::EmptyResponse => true,
        }
    }
}

/// Errors that can occur while reading or writing Word documents
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The .docx container could not be opened or is missing parts
    #[error("Invalid document container: {0}")]
    Container(String),

    /// The document XML could not be parsed
    #[error("Failed to parse document XML: {0}")]
    Xml(String),

    /// The document exceeds the total character ceiling
    #[error("Document exceeds the {limit} character limit (has {chars})")]
    TooLarge {
        /// Total characters counted across all paragraphs
        chars: usize,
        /// Configured ceiling
        limit: usize
    },

    /// The output document could not be assembled
    #[error("Failed to write output document: {0}")]
    Write(String),
}

/// Errors that can occur during the correction pipeline
#[derive(Error, Debug)]
pub enum CorrectionError {
    /// Fatal error from the backend (invalid credential); aborts the run
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with document processing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// No usable credential for a backend that requires one
    #[error("Missing API key for provider {0}")]
    MissingCredential(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document processing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from the correction pipeline
    #[error("Correction error: {0}")]
    Correction(#[from] CorrectionError),

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
