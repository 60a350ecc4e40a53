//! Vault client implementation

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::{debug, error, info};
use url::Url;
use vaultdiag_errors::{AppError, AppResult};
use vaultdiag_ports::{SecretData, SecretStore};
use vaultrs::auth::approle;
use vaultrs::client::{Client, VaultClient as VaultRsClient, VaultClientSettingsBuilder};
use vaultrs::kv2;

use crate::config::VaultConfig;
use crate::error::map_vault_error;

/// Vault client for secret reads
pub struct VaultClient {
    client: VaultRsClient,
    mount_path: String,
}

impl VaultClient {
    /// Create a new Vault client and log in with AppRole
    ///
    /// Any failure here is reported as `AppError::Connection` and is not retried.
    pub async fn connect(config: VaultConfig) -> AppResult<Self> {
        info!(endpoint = %config.endpoint, "Connecting to Vault");

        match Self::login(&config).await {
            Ok(client) => {
                info!("Successfully authenticated with Vault");
                Ok(Self {
                    client,
                    mount_path: config.mount_path,
                })
            }
            Err(e) => {
                error!(endpoint = %config.endpoint, error = %e, "Failed to create Vault client");
                Err(e)
            }
        }
    }

    async fn login(config: &VaultConfig) -> AppResult<VaultRsClient> {
        // The settings builder panics on a malformed address
        Url::parse(&config.endpoint).map_err(|e| {
            AppError::connection(format!("Invalid Vault address '{}': {}", config.endpoint, e))
        })?;

        let settings = VaultClientSettingsBuilder::default()
            .address(&config.endpoint)
            .build()
            .map_err(|e| AppError::connection(format!("Failed to build Vault client settings: {}", e)))?;

        let mut client = VaultRsClient::new(settings)
            .map_err(|e| AppError::connection(format!("Failed to create Vault client: {}", e)))?;

        debug!(mount = %config.login_mount, "Authenticating with AppRole");
        let auth = approle::login(
            &client,
            &config.login_mount,
            config.role_id.expose_secret(),
            config.secret_id.expose_secret(),
        )
        .await
        .map_err(|e| AppError::connection(format!("AppRole authentication failed: {}", e)))?;
        client.set_token(&auth.client_token);

        Ok(client)
    }

    /// KV mount this client reads from
    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    async fn read_secret(&self, path: &str) -> AppResult<SecretData> {
        debug!(path = %path, "Reading secret from Vault");

        let secret: SecretData = kv2::read(&self.client, &self.mount_path, path)
            .await
            .map_err(|e| map_vault_error(e, &format!("Failed to read secret at path: {}", path)))?;

        debug!(path = %path, fields = secret.len(), "Successfully read secret");
        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultConfigBuilder;

    #[tokio::test]
    async fn test_malformed_address_is_connection_error() {
        let config = VaultConfigBuilder::new("not a url")
            .with_approle("role", "secret")
            .build();

        let result = VaultClient::connect(config).await;
        assert!(matches!(result, Err(AppError::Connection(_))));
    }

    #[tokio::test]
    async fn test_unreachable_vault_is_connection_error() {
        let config = VaultConfigBuilder::new("http://127.0.0.1:1")
            .with_approle("role", "secret")
            .build();

        let result = VaultClient::connect(config).await;
        assert!(matches!(result, Err(AppError::Connection(_))));
    }

    #[tokio::test]
    #[ignore] // Requires running Vault server
    async fn test_vault_connection() {
        let config = VaultConfigBuilder::new(
            std::env::var("VAULT_ADDR").unwrap_or_else(|_| "http://127.0.0.1:8200".to_string()),
        )
        .with_approle(
            std::env::var("VAULT_ROLE_ID").unwrap(),
            std::env::var("VAULT_SECRET_ID").unwrap(),
        )
        .build();

        let client = VaultClient::connect(config).await;
        assert!(client.is_ok());
    }
}
