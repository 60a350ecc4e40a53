//! 密钥存储 trait 定义

use async_trait::async_trait;
use std::collections::HashMap;
use vaultdiag_errors::AppResult;

/// 某个路径下的全部字段
pub type SecretData = HashMap<String, serde_json::Value>;

/// 远程密钥存储（KV v2 读取）
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// 读取路径下当前版本的全部字段
    ///
    /// 路径存在但没有任何字段时返回空 map
    async fn read_secret(&self, path: &str) -> AppResult<SecretData>;
}
