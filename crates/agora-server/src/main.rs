mod config;

use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use agora_api::mailer::LogMailer;
use agora_api::{AppState, AppStateInner};

use crate::config::Config;

const KEY_PRUNE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora=debug,agora_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = agora_db::Database::open(&config.db_path)?;
    tokio::fs::create_dir_all(&config.uploads_dir).await?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret.clone(),
        uploads_dir: config.uploads_dir.clone(),
        api_base: config.api_base.clone(),
        frontend_host: config.frontend_host.clone(),
        mailer: Arc::new(LogMailer),
    });

    tokio::spawn(prune_keys(state.clone()));

    let app = agora_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("Agora server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Agora server stopped");
    Ok(())
}

/// Drops expired confirmation and recovery keys once an hour.
async fn prune_keys(state: AppState) {
    let mut interval = tokio::time::interval(KEY_PRUNE_INTERVAL);
    loop {
        interval.tick().await;
        let state = state.clone();
        match tokio::task::spawn_blocking(move || state.db.prune_expired_keys()).await {
            Ok(Ok(0)) => {}
            Ok(Ok(removed)) => info!(removed, "Pruned expired keys"),
            Ok(Err(e)) => error!("Key pruning failed: {}", e),
            Err(e) => error!("Key pruning task panicked: {}", e),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
