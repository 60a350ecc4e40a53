//! 诊断报告
//!
//! 同时探测 Vault（读取数据库连接串）与数据库连通性，
//! 两个探测互不影响，错误只记录在结果中，不向上传播

use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use vaultdiag_ports::{ConnectionStringProvider, ConnectivityProbe};

/// 单次诊断结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticResult {
    pub vault_connection_success: bool,
    pub vault_connection_string: Option<String>,
    pub vault_error: Option<String>,
    pub database_connection_success: bool,
    pub database_error: Option<String>,
}

struct VaultProbe {
    success: bool,
    connection_string: Option<String>,
    error: Option<String>,
}

struct DatabaseProbe {
    success: bool,
    error: Option<String>,
}

/// 诊断报告器
#[derive(Clone)]
pub struct DiagnosticReporter {
    connection_strings: Arc<dyn ConnectionStringProvider>,
    database: Arc<dyn ConnectivityProbe>,
}

impl DiagnosticReporter {
    pub fn new(
        connection_strings: Arc<dyn ConnectionStringProvider>,
        database: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            connection_strings,
            database,
        }
    }

    /// 执行诊断，永不失败
    pub async fn run_diagnostics(&self) -> DiagnosticResult {
        let (vault, database) = tokio::join!(self.probe_vault(), self.probe_database());

        counter!(
            "diagnostics_runs_total",
            "vault" => outcome(vault.success),
            "database" => outcome(database.success)
        )
        .increment(1);

        DiagnosticResult {
            vault_connection_success: vault.success,
            vault_connection_string: vault.connection_string,
            vault_error: vault.error,
            database_connection_success: database.success,
            database_error: database.error,
        }
    }

    async fn probe_vault(&self) -> VaultProbe {
        match self.connection_strings.connection_string().await {
            Ok(connection_string) => {
                info!("Successfully retrieved connection string from Vault");
                VaultProbe {
                    success: !connection_string.is_empty(),
                    connection_string: Some(connection_string),
                    error: None,
                }
            }
            Err(e) => {
                error!(error = %e, "Vault connection test failed");
                VaultProbe {
                    success: false,
                    connection_string: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn probe_database(&self) -> DatabaseProbe {
        match self.database.can_connect().await {
            Ok(()) => {
                info!("Successfully connected to database");
                DatabaseProbe {
                    success: true,
                    error: None,
                }
            }
            Err(e) => {
                error!(error = %e, "Database connection test failed");
                DatabaseProbe {
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn outcome(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}
