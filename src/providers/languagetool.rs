use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;
use reqwest::Client;
use log::error;

use crate::errors::ProviderError;
use crate::providers::{CorrectionRequest, CorrectorBackend};

/// LanguageTool client for a locally running grammar-checking server.
///
/// Unlike the LLM backends, LanguageTool returns a list of rule matches
/// with suggested replacements instead of a rewritten text, so the client
/// applies the first suggestion of each match itself.
#[derive(Debug)]
pub struct LanguageTool {
    /// Base URL of the LanguageTool server
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Response of the /v2/check endpoint
#[derive(Debug, Deserialize)]
pub struct CheckResponse {
    /// Rule matches found in the text
    #[serde(default)]
    pub matches: Vec<RuleMatch>,
}

/// A single rule match with its suggested replacements
#[derive(Debug, Deserialize)]
pub struct RuleMatch {
    /// Offset of the flagged span, in characters
    pub offset: usize,
    /// Length of the flagged span, in characters
    pub length: usize,
    /// Suggested replacements, best first
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

/// A suggested replacement value
#[derive(Debug, Deserialize)]
pub struct Replacement {
    /// Replacement text
    pub value: String,
}

impl LanguageTool {
    /// Create a new LanguageTool client from a complete URL
    pub fn from_url(url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Check a text and return the raw rule matches
    pub async fn check(&self, text: &str, language: &str) -> Result<CheckResponse, ProviderError> {
        let url = format!("{}/v2/check", self.base_url);

        let response = self.client.post(&url)
            .form(&[("text", text), ("language", language)])
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to send request to LanguageTool: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("LanguageTool error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        response.json::<CheckResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse LanguageTool response: {}", e)))
    }

    /// Apply the first suggested replacement of each match, right to left
    /// so earlier offsets stay valid. Matches overlapping a citation
    /// placeholder token are skipped.
    ///
    /// LanguageTool offsets count characters; this indexes by char, which
    /// matches for all BMP text.
    pub fn apply_matches(text: &str, matches: &[RuleMatch]) -> String {
        let chars: Vec<char> = text.chars().collect();
        let protected = placeholder_char_ranges(text);

        let mut sorted: Vec<&RuleMatch> = matches.iter()
            .filter(|m| !m.replacements.is_empty())
            .filter(|m| m.offset + m.length <= chars.len())
            .filter(|m| {
                !protected.iter()
                    .any(|(start, end)| m.offset < *end && m.offset + m.length > *start)
            })
            .collect();
        sorted.sort_by(|a, b| b.offset.cmp(&a.offset));

        let mut result = chars;
        for m in sorted {
            let replacement: Vec<char> = m.replacements[0].value.chars().collect();
            result.splice(m.offset..m.offset + m.length, replacement);
        }
        result.into_iter().collect()
    }
}

/// Char-index ranges of citation placeholder tokens within a text
fn placeholder_char_ranges(text: &str) -> Vec<(usize, usize)> {
    crate::correction::citations::CitationGuard::placeholder_byte_ranges(text)
        .into_iter()
        .map(|(start, end)| {
            let char_start = text[..start].chars().count();
            let char_len = text[start..end].chars().count();
            (char_start, char_start + char_len)
        })
        .collect()
}

#[async_trait]
impl CorrectorBackend for LanguageTool {
    async fn correct(&self, request: &CorrectionRequest) -> Result<String, ProviderError> {
        let response = self.check(&request.text, &request.language).await?;
        Ok(Self::apply_matches(&request.text, &response.matches))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.check("Hello", "en").await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "languagetool"
    }
}
