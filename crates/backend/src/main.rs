use std::sync::Arc;

use anyhow::Result;
use axum::{extract::Request, middleware};
use tokio::{net::TcpListener, sync::Notify};
use tower_http::{
    limit::RequestBodyLimitLayer,
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use libs::util;

use backend::{
    Config, app_router,
    common::{ApiToken, AppState, metrics},
    config::CacheKind,
    db::{MemoryCache, SharedCache, SqliteCache},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("LOG_LEVEL"))
        .init();

    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let cache: SharedCache = match config.backend_cache {
        CacheKind::Sqlite => {
            tracing::info!("using sqlite cache at {}", config.cache_path().display());
            Arc::new(SqliteCache::open(config.cache_path())?)
        }
        CacheKind::Memory => {
            tracing::warn!("using in-memory cache; credentials are lost on restart");
            Arc::new(MemoryCache::new())
        }
    };
    let state = AppState::new(
        cache,
        ApiToken::new(config.api_token.clone()),
        &config.google_discovery_url,
    );

    let api_router = app_router(state)
        .route_layer(middleware::from_fn(metrics::track_http))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    client_ip = %req.headers().get("x-forwarded-for").and_then(|h| h.to_str().ok())
                    .unwrap_or("unknown"),
                )
            })
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO))
            .on_failure(DefaultOnFailure::new().level(Level::INFO))
        )
        .layer(RequestBodyLimitLayer::new(1024 * 1024 /* 1MiB */));
    let metrics_router = metrics::prometheus_router()?;

    let shutdown_notify = Arc::new(Notify::new());
    tokio::spawn(util::listen_for_shutdown(shutdown_notify.clone()));

    let api_listener = TcpListener::bind(format!("0.0.0.0:{}", config.backend_port)).await?;
    let metrics_listener = TcpListener::bind(format!("0.0.0.0:{}", config.prometheus_port)).await?;

    tracing::info!("⇢ API listening on: http://{}", api_listener.local_addr()?);
    tracing::info!(
        "⇢ Metrics listening on: http://{}/metrics",
        metrics_listener.local_addr()?
    );

    let api_server = axum::serve(api_listener, api_router).with_graceful_shutdown({
        let n = shutdown_notify.clone();
        async move { n.notified().await }
    });
    let metrics_server = axum::serve(metrics_listener, metrics_router).with_graceful_shutdown({
        let n = shutdown_notify.clone();
        async move { n.notified().await }
    });

    tokio::try_join!(api_server, metrics_server)?;

    Ok(())
}
