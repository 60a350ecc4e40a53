//! vaultdiag-adapter-vault - HashiCorp Vault adapter
//!
//! Provides read-through cached secret access on top of Vault:
//! - AppRole authentication
//! - KV v2 secrets engine reads
//! - In-process TTL cache keyed by path/field
//! - Automatic error mapping to AppError

pub mod cache;
pub mod client;
pub mod config;
pub mod connection_string;
pub mod error;
pub mod secrets;

pub use cache::{CacheKey, CachedSecret, MAX_TTL, SecretCache};
pub use client::VaultClient;
pub use config::{VaultConfig, VaultConfigBuilder};
pub use connection_string::{CONNECTION_STRING_KEY, ConnectionStringAccessor};
pub use secrets::SecretClient;
