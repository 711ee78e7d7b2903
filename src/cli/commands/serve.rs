use anyhow::Context;

use crate::config::AppConfig;
use crate::database::schema::migrate;
use crate::database::DatabaseManager;
use crate::router::app;
use crate::state::AppState;

pub async fn handle(mut config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.api.port = port;
    }

    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open database")?;
    migrate(&db).await.context("failed to apply schema")?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Meet Team API listening on http://{} ({:?})", bind_addr, config.environment);

    let state = AppState::new(config, db.clone());
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
