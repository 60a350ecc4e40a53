//! Basic usage example for vaultdiag-adapter-vault
//!
//! Run with:
//! ```bash
//! export VAULT_ADDR=http://127.0.0.1:8200
//! export VAULT_ROLE_ID=your-role-id
//! export VAULT_SECRET_ID=your-secret-id
//! cargo run -p vaultdiag-adapter-vault --example basic_usage -- sql
//! ```

use std::sync::Arc;

use vaultdiag_adapter_vault::{
    ConnectionStringAccessor, SecretCache, SecretClient, VaultClient, VaultConfigBuilder,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "sql".to_string());

    let config = VaultConfigBuilder::new(
        std::env::var("VAULT_ADDR").unwrap_or_else(|_| "http://127.0.0.1:8200".to_string()),
    )
    .with_approle(
        std::env::var("VAULT_ROLE_ID")?,
        std::env::var("VAULT_SECRET_ID")?,
    )
    .with_mount_path("secret")
    .build();

    println!("Vault endpoint: {}", config.endpoint);
    println!("Mount path: {}", config.mount_path);

    let store = Arc::new(VaultClient::connect(config).await?);
    let cache = Arc::new(SecretCache::from_minutes(30));
    let client = Arc::new(SecretClient::new(store, cache.clone()));

    let fields = client.fetch_all(&path).await?;
    println!("Fields at '{}':", path);
    let mut names: Vec<_> = fields.keys().collect();
    names.sort();
    for name in names {
        println!("  - {}", name);
    }

    let accessor = ConnectionStringAccessor::new(client, path);
    match accessor.resolve_connection_string().await {
        Ok(value) => println!("connectionstring resolved ({} chars)", value.len()),
        Err(e) => println!("connectionstring not available: {}", e),
    }

    println!("Cached entries: {}", cache.entry_count().await);
    Ok(())
}
