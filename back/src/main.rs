mod config;
mod db;
mod error;
mod extract;
mod v1;

use std::{sync::Arc, time::Duration};

use axum::{http::HeaderValue, Router};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use clap::Parser;
use sqlx::SqlitePool;
use tokio::signal;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    let origin: HeaderValue = config.cors_origin.parse()?;

    let pool = db::connect(&config.database, config.max_connections).await?;
    db::init_schema(&pool).await?;
    info!(database = %config.database.display(), "database ready");

    let state = Arc::new(AppState { db: pool });
    let app = app(state, origin);

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    match config.tls() {
        Some((cert, key)) => {
            let tls = RustlsConfig::from_pem_file(cert, key).await?;
            info!(bind = %config.bind, "listening with tls");

            axum_server::bind_rustls(config.bind, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!(bind = %config.bind, "listening");

            axum_server::bind(config.bind)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    info!("server stopped");

    Ok(())
}

/// Shared by every handler. All todo state lives in the database.
#[derive(Debug)]
pub struct AppState {
    pub db: SqlitePool,
}

pub fn app(state: Arc<AppState>, origin: HeaderValue) -> Router {
    // credentials forbid wildcards, so methods and headers echo the request
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    Router::new()
        .merge(v1::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {:?}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {:?}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
