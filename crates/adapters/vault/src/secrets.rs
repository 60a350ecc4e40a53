//! Read-through cached secret access

use metrics::counter;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};
use vaultdiag_errors::{AppError, AppResult};
use vaultdiag_ports::{SecretData, SecretStore};

use crate::cache::SecretCache;

/// Secret client that serves reads from the cache and falls back to the store
///
/// A miss performs exactly one store read. Failures are logged and returned
/// unchanged; nothing is retried. Concurrent misses for the same key may each
/// hit the store.
#[derive(Clone)]
pub struct SecretClient {
    store: Arc<dyn SecretStore>,
    cache: Arc<SecretCache>,
}

impl SecretClient {
    pub fn new(store: Arc<dyn SecretStore>, cache: Arc<SecretCache>) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &SecretCache {
        &self.cache
    }

    /// Fetch a single field of the secret at `path`
    pub async fn fetch_field(&self, path: &str, key: &str) -> AppResult<String> {
        ensure_not_blank(path, "path")?;
        ensure_not_blank(key, "key")?;

        if let Some(value) = self.cache.get_field(path, key).await {
            counter!("vault_secret_cache_hits_total").increment(1);
            debug!(path = %path, key = %key, "Retrieved secret from cache");
            return Ok(value);
        }
        counter!("vault_secret_cache_misses_total").increment(1);

        match self.read_field(path, key).await {
            Ok(value) => {
                self.cache.insert_field(path, key, value.clone()).await;
                debug!(path = %path, key = %key, "Retrieved and cached secret");
                Ok(value)
            }
            Err(e) => {
                error!(path = %path, key = %key, error = %e, "Failed to retrieve secret from Vault");
                Err(e)
            }
        }
    }

    /// Fetch every field of the secret at `path`
    pub async fn fetch_all(&self, path: &str) -> AppResult<Arc<SecretData>> {
        ensure_not_blank(path, "path")?;

        if let Some(data) = self.cache.get_all(path).await {
            counter!("vault_secret_cache_hits_total").increment(1);
            debug!(path = %path, "Retrieved all secrets from cache");
            return Ok(data);
        }
        counter!("vault_secret_cache_misses_total").increment(1);

        match self.read_all(path).await {
            Ok(data) => {
                let data = Arc::new(data);
                self.cache.insert_all(path, data.clone()).await;
                debug!(path = %path, fields = data.len(), "Retrieved and cached all secrets");
                Ok(data)
            }
            Err(e) => {
                error!(path = %path, error = %e, "Failed to retrieve secrets from Vault");
                Err(e)
            }
        }
    }

    async fn read_field(&self, path: &str, key: &str) -> AppResult<String> {
        let secret = self.read(path).await?;
        secret.get(key).and_then(value_to_string).ok_or_else(|| {
            AppError::not_found(format!("Secret key '{}' not found in path '{}'", key, path))
        })
    }

    async fn read_all(&self, path: &str) -> AppResult<SecretData> {
        let secret = self.read(path).await?;
        if secret.is_empty() {
            return Err(AppError::invalid_state(format!(
                "No secrets found in path '{}'",
                path
            )));
        }
        Ok(secret)
    }

    async fn read(&self, path: &str) -> AppResult<SecretData> {
        let result = self.store.read_secret(path).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind().as_str(),
        };
        counter!("vault_secret_reads_total", "outcome" => outcome).increment(1);
        result
    }
}

fn ensure_not_blank(value: &str, name: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_argument(format!(
            "{} cannot be null or empty",
            name
        )));
    }
    Ok(())
}

/// Render a KV value; strings are taken verbatim, `null` counts as absent,
/// everything else as JSON text
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory store that counts every read
    #[derive(Default)]
    pub(crate) struct CountingStore {
        secrets: Mutex<HashMap<String, SecretData>>,
        failure: Mutex<Option<AppError>>,
        reads: AtomicUsize,
    }

    impl CountingStore {
        pub(crate) fn with_secret(path: &str, fields: Value) -> Self {
            let store = Self::default();
            store.put(path, fields);
            store
        }

        pub(crate) fn put(&self, path: &str, fields: Value) {
            let data: SecretData = serde_json::from_value(fields).unwrap();
            self.secrets.lock().unwrap().insert(path.to_string(), data);
        }

        pub(crate) fn fail_with(&self, err: AppError) {
            *self.failure.lock().unwrap() = Some(err);
        }

        pub(crate) fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SecretStore for CountingStore {
        async fn read_secret(&self, path: &str) -> AppResult<SecretData> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.failure.lock().unwrap().clone() {
                return Err(err);
            }
            self.secrets
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| AppError::not_found(format!("no secret at {}", path)))
        }
    }

    fn client_with(store: Arc<CountingStore>, ttl: Duration) -> SecretClient {
        SecretClient::new(store, Arc::new(SecretCache::new(ttl)))
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store() {
        let store = Arc::new(CountingStore::with_secret(
            "secret/data/sql",
            json!({ "connectionstring": "Server=db;Database=app" }),
        ));
        let client = client_with(store.clone(), Duration::from_secs(1800));

        let first = client.fetch_field("secret/data/sql", "connectionstring").await.unwrap();
        assert_eq!(first, "Server=db;Database=app");
        assert_eq!(store.reads(), 1);

        let second = client.fetch_field("secret/data/sql", "connectionstring").await.unwrap();
        assert_eq!(second, first);
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_exactly_one_read() {
        // 30 minute scenario scaled down: ttl 300ms, second call inside, third after
        let store = Arc::new(CountingStore::with_secret(
            "secret/data/sql",
            json!({ "connectionstring": "Server=db;" }),
        ));
        let client = client_with(store.clone(), Duration::from_millis(300));

        client.fetch_field("secret/data/sql", "connectionstring").await.unwrap();
        assert_eq!(store.reads(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        client.fetch_field("secret/data/sql", "connectionstring").await.unwrap();
        assert_eq!(store.reads(), 1);

        store.put("secret/data/sql", json!({ "connectionstring": "Server=db2;" }));
        tokio::time::sleep(Duration::from_millis(400)).await;
        let refreshed = client.fetch_field("secret/data/sql", "connectionstring").await.unwrap();
        assert_eq!(refreshed, "Server=db2;");
        assert_eq!(store.reads(), 2);

        client.fetch_field("secret/data/sql", "connectionstring").await.unwrap();
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_blank_arguments_rejected_without_io() {
        let store = Arc::new(CountingStore::with_secret("sql", json!({ "k": "v" })));
        let client = client_with(store.clone(), Duration::from_secs(60));

        for (path, key) in [("", "k"), ("sql", ""), ("   ", "k"), ("sql", "\t")] {
            let result = client.fetch_field(path, key).await;
            assert!(matches!(result, Err(AppError::InvalidArgument(_))), "{path:?}/{key:?}");
        }
        assert!(matches!(client.fetch_all(" ").await, Err(AppError::InvalidArgument(_))));
        assert_eq!(store.reads(), 0);
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found_and_not_cached() {
        let store = Arc::new(CountingStore::with_secret("sql", json!({ "user": "app" })));
        let client = client_with(store.clone(), Duration::from_secs(60));

        let result = client.fetch_field("sql", "password").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = client.fetch_field("sql", "password").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_empty_secret() {
        let store = Arc::new(CountingStore::with_secret("empty", json!({})));
        let client = client_with(store.clone(), Duration::from_secs(60));

        assert!(matches!(client.fetch_all("empty").await, Err(AppError::InvalidState(_))));
        assert!(matches!(
            client.fetch_field("empty", "anything").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_all_is_cached() {
        let store = Arc::new(CountingStore::with_secret(
            "app",
            json!({ "user": "app", "port": 5432, "tls": true }),
        ));
        let client = client_with(store.clone(), Duration::from_secs(60));

        let data = client.fetch_all("app").await.unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.get("port"), Some(&json!(5432)));

        let again = client.fetch_all("app").await.unwrap();
        assert!(Arc::ptr_eq(&data, &again));
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_non_string_values_render_as_json() {
        let store = Arc::new(CountingStore::with_secret("app", json!({ "port": 5432, "tls": true })));
        let client = client_with(store, Duration::from_secs(60));

        assert_eq!(client.fetch_field("app", "port").await.unwrap(), "5432");
        assert_eq!(client.fetch_field("app", "tls").await.unwrap(), "true");
    }

    #[tokio::test]
    async fn test_null_value_is_not_found_and_not_cached() {
        let store = Arc::new(CountingStore::with_secret("app", json!({ "password": null })));
        let client = client_with(store.clone(), Duration::from_secs(60));

        for _ in 0..2 {
            let result = client.fetch_field("app", "password").await;
            assert!(matches!(result, Err(AppError::NotFound(_))));
        }
        assert_eq!(store.reads(), 2);
        assert!(client.cache().get_field("app", "password").await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_all_rereads_after_ttl() {
        let store = Arc::new(CountingStore::with_secret("app", json!({ "user": "app" })));
        let client = client_with(store.clone(), Duration::from_millis(300));

        client.fetch_all("app").await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        client.fetch_all("app").await.unwrap();
        assert_eq!(store.reads(), 1);

        store.put("app", json!({ "user": "app", "password": "rotated" }));
        tokio::time::sleep(Duration::from_millis(400)).await;
        let refreshed = client.fetch_all("app").await.unwrap();
        assert_eq!(refreshed.len(), 2);
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_field_named_all_is_independent_of_whole_path_read() {
        let store = Arc::new(CountingStore::with_secret(
            "app",
            json!({ "all": "literal", "other": "x" }),
        ));
        let client = client_with(store.clone(), Duration::from_secs(60));

        let data = client.fetch_all("app").await.unwrap();
        assert_eq!(data.len(), 2);

        let value = client.fetch_field("app", "all").await.unwrap();
        assert_eq!(value, "literal");
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_store_errors_propagate_unchanged() {
        let store = Arc::new(CountingStore::with_secret("sql", json!({ "k": "v" })));
        store.fail_with(AppError::connection("connection refused"));
        let client = client_with(store.clone(), Duration::from_secs(60));

        let err = client.fetch_field("sql", "k").await.unwrap_err();
        assert!(matches!(err, AppError::Connection(ref msg) if msg == "connection refused"));
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_fetch_all_store_errors_propagate_and_are_not_cached() {
        let store = Arc::new(CountingStore::with_secret("app", json!({ "user": "app" })));
        store.fail_with(AppError::forbidden("permission denied"));
        let client = client_with(store.clone(), Duration::from_secs(60));

        let err = client.fetch_all("app").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref msg) if msg == "permission denied"));

        assert!(client.fetch_all("app").await.is_err());
        assert_eq!(store.reads(), 2);
        assert!(client.cache().get_all("app").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_reads_after_warmup_hit_cache() {
        let store = Arc::new(CountingStore::with_secret("sql", json!({ "k": "v" })));
        let client = client_with(store.clone(), Duration::from_secs(60));
        client.fetch_field("sql", "k").await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.fetch_field("sql", "k").await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "v");
        }
        assert_eq!(store.reads(), 1);
    }
}
