//! In-process TTL cache for secrets read from Vault

use moka::future::Cache;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use vaultdiag_ports::SecretData;

/// Cache key for a secret lookup
///
/// The whole-path entry is a separate variant, so a field literally named
/// `all` never shares an entry with the whole-path read of the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A single field of the secret at `path`
    Field { path: String, key: String },
    /// Every field of the secret at `path`
    All { path: String },
}

impl CacheKey {
    pub fn field(path: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Field {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn all(path: impl Into<String>) -> Self {
        Self::All { path: path.into() }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Field { path, .. } | Self::All { path } => path,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { path, key } => write!(f, "vault_{}_{}", path, key),
            Self::All { path } => write!(f, "vault_{}_all", path),
        }
    }
}

/// Cached value
#[derive(Clone)]
pub enum CachedSecret {
    Field(Arc<String>),
    All(Arc<SecretData>),
}

impl fmt::Debug for CachedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(_) => f.write_str("Field([REDACTED])"),
            Self::All(data) => write!(f, "All({} fields)", data.len()),
        }
    }
}

/// Longest TTL the cache accepts; moka rejects anything past 1000 years
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Secret cache with a fixed, absolute time-to-live
///
/// Entries expire `ttl` after insertion; reads never extend an entry. The
/// cache is unbounded since the key space is limited to configured paths.
#[derive(Clone)]
pub struct SecretCache {
    inner: Cache<CacheKey, CachedSecret>,
    ttl: Duration,
}

impl SecretCache {
    /// Build a cache; `ttl` is clamped to [`MAX_TTL`]
    pub fn new(ttl: Duration) -> Self {
        let ttl = ttl.min(MAX_TTL);
        let inner = Cache::builder().time_to_live(ttl).build();
        Self { inner, ttl }
    }

    pub fn from_minutes(minutes: u64) -> Self {
        Self::new(Duration::from_secs(minutes.saturating_mul(60)))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CachedSecret> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, value: CachedSecret) {
        self.inner.insert(key, value).await;
    }

    /// Cached value of a single field
    pub async fn get_field(&self, path: &str, key: &str) -> Option<String> {
        match self.get(&CacheKey::field(path, key)).await {
            Some(CachedSecret::Field(value)) => Some(value.as_ref().clone()),
            _ => None,
        }
    }

    pub async fn insert_field(&self, path: &str, key: &str, value: String) {
        self.insert(CacheKey::field(path, key), CachedSecret::Field(Arc::new(value)))
            .await;
    }

    /// Cached whole-path read
    pub async fn get_all(&self, path: &str) -> Option<Arc<SecretData>> {
        match self.get(&CacheKey::all(path)).await {
            Some(CachedSecret::All(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn insert_all(&self, path: &str, data: Arc<SecretData>) {
        self.insert(CacheKey::all(path), CachedSecret::All(data)).await;
    }

    /// Approximate number of live entries
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

impl fmt::Debug for SecretCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
