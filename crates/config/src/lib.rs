//! vaultdiag-config - 配置加载库

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Vault 配置
#[derive(Debug, Clone, Deserialize)]
pub struct VaultSettings {
    pub url: String,
    pub role_id: Secret<String>,
    pub secret_id: Secret<String>,
    /// 存放数据库连接串的 KV 路径
    pub sql_secret_path: String,
    #[serde(default = "default_cache_expiration_minutes")]
    pub cache_expiration_minutes: u64,
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
}

fn default_cache_expiration_minutes() -> u64 {
    30
}

/// 缓存过期时间上限（一年）
pub const MAX_CACHE_EXPIRATION_MINUTES: u64 = 365 * 24 * 60;

fn default_mount_path() -> String {
    "secret".to_string()
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 后备连接串（用于连通性探测）
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    5
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    pub vault: VaultSettings,
    pub database: DatabaseConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 优先级：`default.toml` < `{APP_ENV}.toml` < `VAULTDIAG_` 前缀环境变量
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let figment = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("VAULTDIAG_").split("__"));

        Self::from_figment(figment)
    }

    /// 从已组装的 Figment 提取并校验
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.vault.url.trim().is_empty() {
            return Err(ConfigError::Invalid("vault.url must not be empty".to_string()));
        }
        if self.vault.sql_secret_path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "vault.sql_secret_path must not be empty".to_string(),
            ));
        }
        if self.vault.cache_expiration_minutes == 0 {
            return Err(ConfigError::Invalid(
                "vault.cache_expiration_minutes must be greater than 0".to_string(),
            ));
        }
        if self.vault.cache_expiration_minutes > MAX_CACHE_EXPIRATION_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "vault.cache_expiration_minutes must be at most {}",
                MAX_CACHE_EXPIRATION_MINUTES
            )));
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}
