use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info};

use nofeed::db::run_migrations;
use nofeed::logging::init_tracing;
use nofeed::router::init_router;
use nofeed::state::AppState;
use nofeed_config::AppConfig;
use nofeed_db::init_db_pool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let pool = init_db_pool(&config.database)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool, config.database.migration_timeout)
        .await
        .context("failed to apply migrations")?;

    let state = AppState::from_pool(&config, pool)?;
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, version = %config.server.version, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
