//! 连通性相关 trait 定义

use async_trait::async_trait;
use vaultdiag_errors::AppResult;

/// 数据库连通性探测
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// 能否用配置的连接串建立连接
    async fn can_connect(&self) -> AppResult<()>;
}

/// 数据库连接串来源
#[async_trait]
pub trait ConnectionStringProvider: Send + Sync {
    async fn connection_string(&self) -> AppResult<String>;
}
