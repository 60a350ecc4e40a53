//! 数据库连通性探测

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};
use vaultdiag_errors::AppResult;
use vaultdiag_ports::ConnectivityProbe;

use crate::connection::{PostgresConfig, check_connection, create_lazy_pool};

/// 基于连接池的 PostgreSQL 探测器
#[derive(Clone)]
pub struct PostgresProbe {
    pool: PgPool,
}

impl PostgresProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 从配置创建（延迟连接）
    pub fn from_config(config: &PostgresConfig) -> AppResult<Self> {
        Ok(Self::new(create_lazy_pool(config)?))
    }
}

#[async_trait]
impl ConnectivityProbe for PostgresProbe {
    async fn can_connect(&self) -> AppResult<()> {
        match check_connection(&self.pool).await {
            Ok(()) => {
                debug!("PostgreSQL connectivity probe passed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "PostgreSQL connectivity probe failed");
                Err(e)
            }
        }
    }
}
