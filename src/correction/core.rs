/*!
 * Core correction service.
 *
 * The service owns a single correction backend behind the `CorrectorBackend`
 * trait and wraps it with everything the backends themselves do not do:
 * retry with exponential backoff, result caching, spacing normalization
 * around citation placeholders, and soft degradation. A paragraph whose
 * correction keeps failing falls back to its original text; only an invalid
 * credential is fatal and propagates as an error.
 */

use std::sync::Arc;
use log::{log, warn, Level};
use parking_lot::Mutex;
use tokio::time::Duration;

use crate::app_config::{CorrectionConfig, CorrectionProvider};
use crate::correction::cache::CorrectionCache;
use crate::correction::citations::CitationGuard;
use crate::errors::{CorrectionError, ProviderError};
use crate::providers::anthropic::Anthropic;
use crate::providers::languagetool::LanguageTool;
use crate::providers::ollama::Ollama;
use crate::providers::openai::OpenAI;
use crate::providers::{CorrectionRequest, CorrectorBackend};

/// Outcome of correcting one masked text
#[derive(Debug, Clone, PartialEq)]
pub enum CorrectionOutcome {
    /// The backend produced a usable correction
    Corrected(String),

    /// The text stays as it was; the reason says why
    Unchanged(UnchangedReason),
}

/// Why a text was left unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnchangedReason {
    /// The input was empty or whitespace-only; no backend call was made
    EmptyInput,

    /// Every retry attempt failed with a retryable error
    RetriesExhausted,

    /// The backend refused the text for content-policy reasons
    ContentBlocked,
}

/// A log entry captured during correction for the issues report
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity of the entry
    pub level: Level,

    /// Message of the entry
    pub message: String,
}

/// Correction service that processes masked paragraph texts
pub struct CorrectionService {
    /// The backend performing the actual correction
    backend: Box<dyn CorrectorBackend>,

    /// Correction configuration (retry policy, prompt, temperature)
    config: CorrectionConfig,

    /// Document language code
    language: String,

    /// System prompt rendered for the document language
    system_prompt: String,

    /// Fingerprint scoping cache entries to this backend setup
    fingerprint: String,

    /// Memoization cache for corrected texts
    cache: CorrectionCache,

    /// Captured warnings for the issues report
    captured_logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl std::fmt::Debug for CorrectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrectionService")
            .field("backend", &self.backend.name())
            .field("language", &self.language)
            .finish()
    }
}

impl CorrectionService {
    /// Build the service from configuration, instantiating the configured
    /// backend. Fails early when a required API key is missing.
    pub fn from_config(config: &CorrectionConfig, language: &str) -> Result<Self, CorrectionError> {
        let api_key = config.get_api_key();
        if config.provider.requires_api_key() && api_key.is_empty() {
            return Err(CorrectionError::MissingCredential(
                config.provider.display_name().to_string(),
            ));
        }

        let endpoint = config.get_endpoint();
        let timeout_secs = config.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .unwrap_or(30);

        let backend: Box<dyn CorrectorBackend> = match config.provider {
            CorrectionProvider::Ollama => Box::new(Ollama::from_url(endpoint, timeout_secs)),
            CorrectionProvider::OpenAI => Box::new(OpenAI::new(&api_key, endpoint, timeout_secs)),
            CorrectionProvider::Anthropic => Box::new(Anthropic::new(&api_key, endpoint, timeout_secs)),
            CorrectionProvider::LanguageTool => Box::new(LanguageTool::from_url(endpoint, timeout_secs)),
        };

        Ok(Self::with_backend(backend, config.clone(), language))
    }

    /// Build the service around an already constructed backend
    pub fn with_backend(
        backend: Box<dyn CorrectorBackend>,
        config: CorrectionConfig,
        language: &str,
    ) -> Self {
        let fingerprint = CorrectionCache::fingerprint(
            backend.name(),
            &config.get_model(),
            &config.get_api_key(),
        );
        let cache = CorrectionCache::new(
            true,
            Duration::from_secs(config.common.cache_ttl_secs),
        );
        let system_prompt = config.render_system_prompt(language);

        Self {
            backend,
            config,
            language: language.to_string(),
            system_prompt,
            fingerprint,
            cache,
            captured_logs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replace the cache, e.g. to share one across services or disable it
    pub fn with_cache(mut self, cache: CorrectionCache) -> Self {
        self.cache = cache;
        self
    }

    /// Correct a single masked text.
    ///
    /// Empty or whitespace-only input returns unchanged without contacting
    /// the backend. Retryable errors are retried with exponential backoff
    /// up to the configured attempt count; exhaustion degrades softly to
    /// the original text. An authentication error is returned as a hard
    /// error so the caller can abort the whole document.
    pub async fn correct_text(&self, masked: &str) -> Result<CorrectionOutcome, CorrectionError> {
        if masked.trim().is_empty() {
            return Ok(CorrectionOutcome::Unchanged(UnchangedReason::EmptyInput));
        }

        if let Some(cached) = self.cache.get(masked, &self.fingerprint) {
            return Ok(CorrectionOutcome::Corrected(cached));
        }

        let request = CorrectionRequest {
            text: masked.to_string(),
            system_prompt: self.system_prompt.clone(),
            model: self.config.get_model(),
            temperature: self.config.common.temperature,
            language: self.language.clone(),
        };

        let attempts = self.config.common.retry_count.max(1);
        for attempt in 1..=attempts {
            match self.backend.correct(&request).await {
                Ok(received) => {
                    let corrected = CitationGuard::normalize_spacing(masked, &received)
                        .trim()
                        .to_string();
                    if corrected.is_empty() {
                        // An empty correction is as retryable as an error
                        if attempt < attempts {
                            let backoff_ms = self.backoff_ms(attempt);
                            warn!(
                                "Correction attempt {}/{} returned empty text; retrying in {}ms",
                                attempt, attempts, backoff_ms
                            );
                            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                            continue;
                        }
                        self.capture(Level::Warn, format!(
                            "{} returned only empty corrections after {} attempts; keeping original text",
                            self.backend.name(), attempts
                        ));
                        return Ok(CorrectionOutcome::Unchanged(UnchangedReason::RetriesExhausted));
                    }
                    self.cache.store(masked, &self.fingerprint, &corrected);
                    return Ok(CorrectionOutcome::Corrected(corrected));
                }
                Err(ProviderError::AuthenticationError(message)) => {
                    self.capture(Level::Error, format!(
                        "Authentication failed for {}: {}",
                        self.backend.name(), message
                    ));
                    return Err(ProviderError::AuthenticationError(message).into());
                }
                Err(ProviderError::ContentBlocked(message)) => {
                    self.capture(Level::Warn, format!(
                        "{} blocked the text: {}; keeping original text",
                        self.backend.name(), message
                    ));
                    return Ok(CorrectionOutcome::Unchanged(UnchangedReason::ContentBlocked));
                }
                Err(e) if attempt < attempts => {
                    let backoff_ms = self.backoff_ms(attempt);
                    warn!(
                        "Correction attempt {}/{} failed: {}; retrying in {}ms",
                        attempt, attempts, e, backoff_ms
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(e) => {
                    self.capture(Level::Warn, format!(
                        "Correction failed after {} attempts: {}; keeping original text",
                        attempts, e
                    ));
                    return Ok(CorrectionOutcome::Unchanged(UnchangedReason::RetriesExhausted));
                }
            }
        }

        // The loop always returns; attempts >= 1
        Ok(CorrectionOutcome::Unchanged(UnchangedReason::RetriesExhausted))
    }

    /// Exponential backoff delay for a given attempt number
    fn backoff_ms(&self, attempt: u32) -> u64 {
        self.config.common.retry_backoff_ms.saturating_mul(1u64 << (attempt - 1))
    }

    /// Minimum interval between backend requests implied by the active
    /// provider's rate limit, if it declares one
    pub fn min_request_interval(&self) -> Option<Duration> {
        self.config
            .get_rate_limit()
            .filter(|rpm| *rpm > 0)
            .map(|rpm| Duration::from_millis(60_000 / u64::from(rpm)))
    }

    /// Test the connection to the configured backend
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        self.backend.test_connection().await
    }

    /// Short name of the active backend
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Cache statistics as (hits, misses, hit_rate)
    pub fn cache_stats(&self) -> (usize, usize, f64) {
        self.cache.stats()
    }

    /// Drain the warnings captured so far
    pub fn take_captured_logs(&self) -> Vec<LogEntry> {
        let mut logs = self.captured_logs.lock();
        std::mem::take(&mut *logs)
    }

    /// Record a warning to both the live log and the issues buffer
    pub(crate) fn capture(&self, level: Level, message: String) {
        log!(level, "{}", message);
        self.captured_logs.lock().push(LogEntry { level, message });
    }
}
