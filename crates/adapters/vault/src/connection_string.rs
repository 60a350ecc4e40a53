//! Database connection string resolved from Vault

use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;
use vaultdiag_errors::AppResult;
use vaultdiag_ports::ConnectionStringProvider;

use crate::secrets::SecretClient;

/// Field holding the connection string inside the SQL secret
pub const CONNECTION_STRING_KEY: &str = "connectionstring";

/// Resolves the SQL connection string from a fixed secret path
#[derive(Clone)]
pub struct ConnectionStringAccessor {
    client: Arc<SecretClient>,
    sql_secret_path: String,
}

impl ConnectionStringAccessor {
    pub fn new(client: Arc<SecretClient>, sql_secret_path: impl Into<String>) -> Self {
        Self {
            client,
            sql_secret_path: sql_secret_path.into(),
        }
    }

    pub fn sql_secret_path(&self) -> &str {
        &self.sql_secret_path
    }

    pub async fn resolve_connection_string(&self) -> AppResult<String> {
        self.client
            .fetch_field(&self.sql_secret_path, CONNECTION_STRING_KEY)
            .await
            .inspect_err(|e| {
                error!(
                    path = %self.sql_secret_path,
                    error = %e,
                    "Failed to retrieve SQL connection string from Vault"
                );
            })
    }
}

#[async_trait]
impl ConnectionStringProvider for ConnectionStringAccessor {
    async fn connection_string(&self) -> AppResult<String> {
        self.resolve_connection_string().await
    }
}
