//! Vault configuration

use secrecy::Secret;
use std::fmt;

/// Vault client configuration
#[derive(Clone)]
pub struct VaultConfig {
    /// Vault server endpoint
    pub endpoint: String,

    /// AppRole role ID for authentication
    pub role_id: Secret<String>,

    /// AppRole secret ID for authentication
    pub secret_id: Secret<String>,

    /// KV v2 secrets engine mount path
    pub mount_path: String,

    /// Mount path of the AppRole auth method
    pub login_mount: String,
}

fn default_mount_path() -> String {
    "secret".to_string()
}

fn default_login_mount() -> String {
    "approle".to_string()
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8200".to_string(),
            role_id: Secret::new(String::new()),
            secret_id: Secret::new(String::new()),
            mount_path: default_mount_path(),
            login_mount: default_login_mount(),
        }
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("endpoint", &self.endpoint)
            .field("role_id", &self.role_id)
            .field("secret_id", &self.secret_id)
            .field("mount_path", &self.mount_path)
            .field("login_mount", &self.login_mount)
            .finish()
    }
}

/// Builder for VaultConfig
pub struct VaultConfigBuilder {
    config: VaultConfig,
}

impl VaultConfigBuilder {
    /// Create a new builder with endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            config: VaultConfig {
                endpoint: endpoint.into(),
                ..Default::default()
            },
        }
    }

    /// Set AppRole credentials
    pub fn with_approle(mut self, role_id: impl Into<String>, secret_id: impl Into<String>) -> Self {
        self.config.role_id = Secret::new(role_id.into());
        self.config.secret_id = Secret::new(secret_id.into());
        self
    }

    /// Set AppRole credentials that are already wrapped
    pub fn with_approle_secrets(mut self, role_id: Secret<String>, secret_id: Secret<String>) -> Self {
        self.config.role_id = role_id;
        self.config.secret_id = secret_id;
        self
    }

    /// Set KV mount path
    pub fn with_mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.config.mount_path = mount_path.into();
        self
    }

    /// Set AppRole auth mount
    pub fn with_login_mount(mut self, login_mount: impl Into<String>) -> Self {
        self.config.login_mount = login_mount.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> VaultConfig {
        self.config
    }
}
