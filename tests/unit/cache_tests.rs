/*!
 * Tests for correction cache functionality
 */

use std::time::Duration;
use docorrect::correction::cache::CorrectionCache;

fn fp() -> String {
    CorrectionCache::fingerprint("mock", "test-model", "")
}

#[test]
fn test_cache_storeAndGet_shouldReturnStoredCorrection() {
    let cache = CorrectionCache::default();
    cache.store("hola mnudo", &fp(), "hola mundo");

    let result = cache.get("hola mnudo", &fp());
    assert_eq!(result, Some("hola mundo".to_string()));
}

#[test]
fn test_cache_get_withMissingKey_shouldReturnNone() {
    let cache = CorrectionCache::default();
    assert!(cache.get("nunca visto", &fp()).is_none());
}

#[test]
fn test_cache_withDisabledCache_shouldBypassStorage() {
    let cache = CorrectionCache::new(false, Duration::from_secs(3600));
    cache.store("texto", &fp(), "texto corregido");

    assert!(cache.get("texto", &fp()).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_cache_withExpiredEntry_shouldReturnNone() {
    let cache = CorrectionCache::new(true, Duration::from_millis(10));
    cache.store("texto", &fp(), "texto corregido");

    std::thread::sleep(Duration::from_millis(30));
    assert!(cache.get("texto", &fp()).is_none());
}

#[test]
fn test_cache_withDifferentFingerprints_shouldNotShareEntries() {
    let cache = CorrectionCache::default();
    let openai_fp = CorrectionCache::fingerprint("openai", "gpt-4o-mini", "key-a");
    let anthropic_fp = CorrectionCache::fingerprint("anthropic", "claude-3-haiku-20240307", "key-b");

    cache.store("texto", &openai_fp, "desde openai");
    assert!(cache.get("texto", &anthropic_fp).is_none());
    assert_eq!(cache.get("texto", &openai_fp), Some("desde openai".to_string()));
}

#[test]
fn test_fingerprint_shouldNotContainRawCredential() {
    let fingerprint = CorrectionCache::fingerprint("openai", "gpt-4o-mini", "sk-secret-key");
    assert!(!fingerprint.contains("sk-secret-key"));
    // SHA-256 hex digest
    assert_eq!(fingerprint.len(), 64);
}

#[test]
fn test_cache_stats_shouldTrackHitsAndMisses() {
    let cache = CorrectionCache::default();
    cache.store("a", &fp(), "b");

    cache.get("a", &fp()); // hit
    cache.get("x", &fp()); // miss
    cache.get("a", &fp()); // hit

    let (hits, misses, hit_rate) = cache.stats();
    assert_eq!(hits, 2);
    assert_eq!(misses, 1);
    assert!((hit_rate - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_cache_clear_shouldDropEntriesAndCounters() {
    let cache = CorrectionCache::default();
    cache.store("a", &fp(), "b");
    cache.get("a", &fp());

    cache.clear();
    assert!(cache.is_empty());
    let (hits, misses, _) = cache.stats();
    assert_eq!(hits, 0);
    assert_eq!(misses, 0);
}

#[test]
fn test_cache_clone_shouldShareStorage() {
    let cache = CorrectionCache::default();
    let cloned = cache.clone();

    cache.store("compartido", &fp(), "sí");
    assert_eq!(cloned.get("compartido", &fp()), Some("sí".to_string()));
}
