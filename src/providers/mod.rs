/*!
 * Provider implementations for different correction backends.
 *
 * This module contains client implementations for the supported backends:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration
 * - Anthropic: Anthropic API integration
 * - LanguageTool: Local grammar-checking HTTP server
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single correction request handed to a backend.
///
/// The text has already had its citations masked; backends receive the
/// placeholder-preservation directive through the system prompt and must
/// return the corrected text verbatim, tokens included.
#[derive(Debug, Clone)]
pub struct CorrectionRequest {
    /// Masked text to correct
    pub text: String,

    /// System prompt guiding LLM backends (ignored by rule-based ones)
    pub system_prompt: String,

    /// Model name, where the backend has a notion of models
    pub model: String,

    /// Sampling temperature for LLM backends
    pub temperature: f32,

    /// Document language code (e.g. "es")
    pub language: String,
}

/// Common trait for all correction backends
///
/// This trait defines the capability interface every backend implements,
/// allowing them to be used interchangeably by the correction service.
/// Backends perform exactly one attempt per call; the retry policy lives
/// in the correction service.
#[async_trait]
pub trait CorrectorBackend: Send + Sync + Debug {
    /// Correct a single masked text
    ///
    /// # Arguments
    /// * `request` - The correction request
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The corrected text or an error
    async fn correct(&self, request: &CorrectionRequest) -> Result<String, ProviderError>;

    /// Test the connection to the backend
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is usable
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

pub mod ollama;
pub mod openai;
pub mod anthropic;
pub mod languagetool;
pub mod mock;
