use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language of the documents to correct (ISO code, e.g. "es", "en")
    pub language: String,

    /// Correction config
    pub correction: CorrectionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Correction provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionProvider {
    // @provider: Ollama (local LLM)
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LanguageTool (local grammar-checking server)
    LanguageTool,
}

impl CorrectionProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LanguageTool => "LanguageTool",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LanguageTool => "languagetool".to_string(),
        }
    }

    /// Whether this provider requires an API key to operate
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }
}

// Implement Display trait for CorrectionProvider
impl std::fmt::Display for CorrectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for CorrectionProvider
impl std::str::FromStr for CorrectionProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "languagetool" => Ok(Self::LanguageTool),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
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

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: CorrectionProvider) -> Self {
        match provider_type {
            CorrectionProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_timeout_secs(),
                rate_limit: None,
            },
            CorrectionProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_timeout_secs(),
                rate_limit: default_openai_rate_limit(),
            },
            CorrectionProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: default_anthropic_timeout_secs(),
                rate_limit: default_anthropic_rate_limit(),
            },
            CorrectionProvider::LanguageTool => Self {
                provider_type: "languagetool".to_string(),
                model: String::new(),
                api_key: String::new(),
                endpoint: default_languagetool_endpoint(),
                timeout_secs: default_timeout_secs(),
                rate_limit: None,
            },
        }
    }
}

/// Correction service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorrectionConfig {
    /// Correction provider to use
    #[serde(default)]
    pub provider: CorrectionProvider,

    /// Available correction providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common correction settings
    #[serde(default)]
    pub common: CorrectionCommonConfig,
}

/// Common correction settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorrectionCommonConfig {
    /// System prompt template for LLM-backed correction
    /// Placeholders: {language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Maximum total characters across all paragraphs of a document
    #[serde(default = "default_max_total_chars")]
    pub max_total_chars: usize,

    /// Pacing delay in milliseconds between consecutive paragraphs
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Time-to-live for memoized correction results, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for CorrectionCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            max_total_chars: default_max_total_chars(),
            pacing_delay_ms: default_pacing_delay_ms(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            cache_ttl_secs: default_cache_ttl_secs(),
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

fn default_timeout_secs() -> u64 {
    30
}

fn default_anthropic_timeout_secs() -> u64 {
    60
}

fn default_max_total_chars() -> usize {
    300_000
}

fn default_pacing_delay_ms() -> u64 {
    100 // Small pause between paragraphs so rate-limited backends are not hammered
}

fn default_retry_count() -> u32 {
    3 // Default to 3 attempts
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.2
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_languagetool_endpoint() -> String {
    // Default port of a locally running LanguageTool HTTP server
    "http://localhost:8010".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_system_prompt() -> String {
    "You are an expert proofreader for the language with ISO code '{language}'. \
     Correct only grammatical and spelling errors in the following text. \
     Do NOT change the original meaning. \
     Do NOT alter, translate or remove the placeholder tokens that look like __CITATION_<hex>__; \
     they must remain exactly as they are. \
     Return ONLY the corrected text, without any introduction, explanation or comment."
        .to_string()
}

fn default_openai_rate_limit() -> Option<u32> {
    Some(60) // 60 requests per minute by default
}

fn default_anthropic_rate_limit() -> Option<u32> {
    // Slightly below the Anthropic API limit of 50 requests per minute
    Some(45)
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(anyhow!("Document language must not be empty"));
        }

        // Validate API key for providers that require one
        if self.correction.provider.requires_api_key() {
            let api_key = self.correction.get_api_key();
            if api_key.is_empty() {
                return Err(anyhow!(
                    "Correction API key is required for {} provider",
                    self.correction.provider.display_name()
                ));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            language: "es".to_string(),
            correction: CorrectionConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl CorrectionConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get a specific provider configuration by type for testing
    pub fn get_provider_config(&self, provider_type: &CorrectionProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
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
            CorrectionProvider::Ollama => default_ollama_model(),
            CorrectionProvider::OpenAI => default_openai_model(),
            CorrectionProvider::Anthropic => default_anthropic_model(),
            CorrectionProvider::LanguageTool => String::new(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        // Default fallback - local providers don't use API keys
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
            CorrectionProvider::Ollama => default_ollama_endpoint(),
            CorrectionProvider::OpenAI => default_openai_endpoint(),
            CorrectionProvider::Anthropic => default_anthropic_endpoint(),
            CorrectionProvider::LanguageTool => default_languagetool_endpoint(),
        }
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.rate_limit;
        }

        // Default fallback based on provider type
        match self.provider {
            CorrectionProvider::Ollama => None,
            CorrectionProvider::OpenAI => default_openai_rate_limit(),
            CorrectionProvider::Anthropic => default_anthropic_rate_limit(),
            CorrectionProvider::LanguageTool => None,
        }
    }

    /// Render the system prompt for a given document language
    pub fn render_system_prompt(&self, language: &str) -> String {
        self.common.system_prompt.replace("{language}", language)
    }
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: CorrectionProvider::default(),
            available_providers: Vec::new(),
            common: CorrectionCommonConfig::default(),
        };

        // Add default providers
        config.available_providers.push(ProviderConfig::new(CorrectionProvider::Ollama));
        config.available_providers.push(ProviderConfig::new(CorrectionProvider::OpenAI));
        config.available_providers.push(ProviderConfig::new(CorrectionProvider::Anthropic));
        config.available_providers.push(ProviderConfig::new(CorrectionProvider::LanguageTool));

        config
    }
}
