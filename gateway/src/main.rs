//! Vault 诊断服务

mod diagnostics;
mod routing;
mod view;

use secrecy::ExposeSecret;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use vaultdiag_adapter_postgres::{PostgresConfig, PostgresProbe};
use vaultdiag_adapter_vault::{
    ConnectionStringAccessor, SecretCache, SecretClient, VaultClient, VaultConfigBuilder,
};
use vaultdiag_bootstrap::{init_runtime, shutdown_signal};
use vaultdiag_config::AppConfig;
use vaultdiag_telemetry::init_metrics;

use diagnostics::DiagnosticReporter;
use routing::AppState;
use view::DiagnosticsView;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let config = AppConfig::load(&config_dir)?;
    init_runtime(&config);

    let metrics = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Metrics disabled");
            None
        }
    };

    // Vault 登录失败直接终止启动
    let vault_config = VaultConfigBuilder::new(config.vault.url.clone())
        .with_approle_secrets(config.vault.role_id.clone(), config.vault.secret_id.clone())
        .with_mount_path(config.vault.mount_path.clone())
        .build();
    let vault = Arc::new(VaultClient::connect(vault_config).await?);

    // 进程级单例缓存
    let cache = Arc::new(SecretCache::from_minutes(config.vault.cache_expiration_minutes));
    info!(
        ttl_minutes = config.vault.cache_expiration_minutes,
        "Secret cache initialized"
    );

    let secrets = Arc::new(SecretClient::new(vault, cache));
    let accessor = Arc::new(ConnectionStringAccessor::new(
        secrets,
        config.vault.sql_secret_path.clone(),
    ));

    let postgres_config = PostgresConfig::new(config.database.url.expose_secret().clone())
        .with_max_connections(config.database.max_connections)
        .with_connect_timeout(Duration::from_secs(config.database.connect_timeout_secs));
    let database = Arc::new(PostgresProbe::from_config(&postgres_config)?);

    let state = AppState {
        reporter: DiagnosticReporter::new(accessor, database),
        view: Arc::new(DiagnosticsView::new()?),
        metrics,
    };

    let app = routing::routes(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "Starting vault diagnostics server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
