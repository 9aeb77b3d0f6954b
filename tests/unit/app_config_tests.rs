/*!
 * Tests for application configuration functionality
 */

use docorrect::app_config::{Config, CorrectionProvider, LogLevel};

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.language, "es");
    assert_eq!(config.correction.provider, CorrectionProvider::Ollama);
    assert_eq!(config.log_level, LogLevel::Info);

    assert_eq!(config.correction.common.max_total_chars, 300_000);
    assert_eq!(config.correction.common.retry_count, 3);
    assert_eq!(config.correction.common.retry_backoff_ms, 1000);
    assert_eq!(config.correction.common.pacing_delay_ms, 100);

    let ollama_config = config.correction.get_provider_config(&CorrectionProvider::Ollama)
        .expect("Ollama provider config should exist");
    assert_eq!(ollama_config.model, "llama3.2:3b");
    assert_eq!(ollama_config.endpoint, "http://localhost:11434");
    assert_eq!(ollama_config.timeout_secs, 30);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    // Start with a valid config
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // Empty language is invalid
    config.language = "".to_string();
    assert!(config.validate().is_err());
    config.language = "es".to_string();

    // OpenAI requires an API key
    config.correction.provider = CorrectionProvider::OpenAI;
    assert!(config.validate().is_err());

    // With a key it validates
    if let Some(provider_config) = config.correction.available_providers.iter_mut()
        .find(|p| p.provider_type == "openai") {
        provider_config.api_key = "sk-test".to_string();
    }
    assert!(config.validate().is_ok());

    // Local providers never need a key
    config.correction.provider = CorrectionProvider::LanguageTool;
    assert!(config.validate().is_ok());
}

#[test]
fn test_provider_fromStr_shouldRoundTripWithDisplay() {
    for provider in [
        CorrectionProvider::Ollama,
        CorrectionProvider::OpenAI,
        CorrectionProvider::Anthropic,
        CorrectionProvider::LanguageTool,
    ] {
        let parsed: CorrectionProvider = provider.to_string().parse().unwrap();
        assert_eq!(parsed, provider);
    }

    assert!("definitely-not-a-provider".parse::<CorrectionProvider>().is_err());
}

#[test]
fn test_renderSystemPrompt_shouldSubstituteLanguage() {
    let config = Config::default();
    let prompt = config.correction.render_system_prompt("es");
    // The raw ISO code reads as a code, not as a language name
    assert!(prompt.contains("ISO code 'es'"));
    assert!(!prompt.contains("{language}"));
    // The placeholder-preservation directive is always present
    assert!(prompt.contains("__CITATION_"));
}

#[test]
fn test_config_serialization_shouldRoundTripThroughJson() {
    let mut config = Config::default();
    config.language = "fr".to_string();
    config.correction.provider = CorrectionProvider::Anthropic;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.language, "fr");
    assert_eq!(parsed.correction.provider, CorrectionProvider::Anthropic);
    assert_eq!(parsed.correction.common.max_total_chars, 300_000);
}

#[test]
fn test_config_deserialization_withMinimalJson_shouldApplyDefaults() {
    let json = r#"{ "language": "es", "correction": {} }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.correction.provider, CorrectionProvider::Ollama);
    assert_eq!(config.correction.common.retry_count, 3);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_getEndpoint_withUnlistedProvider_shouldFallBackToDefault() {
    let mut config = Config::default();
    config.correction.provider = CorrectionProvider::LanguageTool;
    config.correction.available_providers.clear();

    assert_eq!(config.correction.get_endpoint(), "http://localhost:8010");
}
