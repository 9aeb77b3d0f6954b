/*!
 * Tests for the correction service
 */

use std::time::Duration;

use docorrect::app_config::CorrectionConfig;
use docorrect::correction::cache::CorrectionCache;
use docorrect::correction::core::{CorrectionOutcome, CorrectionService, UnchangedReason};
use docorrect::errors::{CorrectionError, ProviderError};
use docorrect::providers::mock::MockBackend;

fn fast_config() -> CorrectionConfig {
    let mut config = CorrectionConfig::default();
    config.common.retry_count = 3;
    config.common.retry_backoff_ms = 1;
    config
}

#[tokio::test]
async fn test_correctText_withIdentityBackend_shouldReturnInput() {
    let service = CorrectionService::with_backend(Box::new(MockBackend::identity()), fast_config(), "es");

    let outcome = service.correct_text("Texto sin errores").await.unwrap();
    assert_eq!(outcome, CorrectionOutcome::Corrected("Texto sin errores".to_string()));
}

#[tokio::test]
async fn test_correctText_withWhitespaceOnlyInput_shouldNotContactBackend() {
    let backend = MockBackend::identity();
    let probe = backend.clone();
    let service = CorrectionService::with_backend(Box::new(backend), fast_config(), "es");

    let outcome = service.correct_text("  \t ").await.unwrap();
    assert_eq!(outcome, CorrectionOutcome::Unchanged(UnchangedReason::EmptyInput));
    assert_eq!(probe.request_count(), 0);
}

#[tokio::test]
async fn test_correctText_withExhaustedRetries_shouldDegradeToUnchanged() {
    let backend = MockBackend::failing();
    let probe = backend.clone();
    let service = CorrectionService::with_backend(Box::new(backend), fast_config(), "es");

    let outcome = service.correct_text("Texto").await.unwrap();
    assert_eq!(outcome, CorrectionOutcome::Unchanged(UnchangedReason::RetriesExhausted));
    assert_eq!(probe.request_count(), 3);
}

#[tokio::test]
async fn test_correctText_withInvalidCredential_shouldFailFastWithoutRetry() {
    let backend = MockBackend::auth_failure();
    let probe = backend.clone();
    let service = CorrectionService::with_backend(Box::new(backend), fast_config(), "es");

    let result = service.correct_text("Texto").await;
    assert!(matches!(
        result,
        Err(CorrectionError::Provider(ProviderError::AuthenticationError(_)))
    ));
    assert_eq!(probe.request_count(), 1);
}

#[tokio::test]
async fn test_correctText_withSharedCache_shouldReuseAcrossServices() {
    let cache = CorrectionCache::new(true, Duration::from_secs(3600));

    let first_backend = MockBackend::identity();
    let first_probe = first_backend.clone();
    let first = CorrectionService::with_backend(Box::new(first_backend), fast_config(), "es")
        .with_cache(cache.clone());

    let second_backend = MockBackend::identity();
    let second_probe = second_backend.clone();
    let second = CorrectionService::with_backend(Box::new(second_backend), fast_config(), "es")
        .with_cache(cache);

    first.correct_text("mismo texto").await.unwrap();
    second.correct_text("mismo texto").await.unwrap();

    assert_eq!(first_probe.request_count(), 1);
    // Same fingerprint (same backend name, model, key), so the second
    // service serves from the shared cache
    assert_eq!(second_probe.request_count(), 0);
}

#[tokio::test]
async fn test_correctText_withFailure_shouldCaptureIssueLog() {
    let service = CorrectionService::with_backend(Box::new(MockBackend::failing()), fast_config(), "es");

    service.correct_text("Texto").await.unwrap();

    let logs = service.take_captured_logs();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].message.contains("keeping original text"));

    // Draining empties the buffer
    assert!(service.take_captured_logs().is_empty());
}

#[tokio::test]
async fn test_testConnection_withHealthyBackend_shouldSucceed() {
    let service = CorrectionService::with_backend(Box::new(MockBackend::identity()), fast_config(), "es");
    assert!(service.test_connection().await.is_ok());
}

#[tokio::test]
async fn test_testConnection_withInvalidCredential_shouldError() {
    // The controller runs this check before processing any paragraph
    let service = CorrectionService::with_backend(Box::new(MockBackend::auth_failure()), fast_config(), "es");
    let result = service.test_connection().await;
    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
}

#[tokio::test]
async fn test_fromConfig_withMissingApiKey_shouldFailEarly() {
    let mut config = CorrectionConfig::default();
    config.provider = docorrect::app_config::CorrectionProvider::OpenAI;
    // Default provider configs carry no API key

    let result = CorrectionService::from_config(&config, "es");
    assert!(matches!(result, Err(CorrectionError::MissingCredential(_))));
}

#[tokio::test]
async fn test_fromConfig_withLocalProvider_shouldNotRequireApiKey() {
    let config = CorrectionConfig::default(); // Ollama
    let service = CorrectionService::from_config(&config, "es").unwrap();
    assert_eq!(service.backend_name(), "ollama");
}
