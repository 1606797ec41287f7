mod config;
mod error;
mod extract;
mod handlers;
mod models;
mod repos;
mod state;
mod stores;
#[cfg(test)]
mod test_utils;

use std::net::SocketAddr;

use anyhow::Result;
use axum::{Router, http};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::{Config, StoreBackend},
    repos::Repos,
    state::AppState,
    stores::Stores,
};

#[derive(Parser)]
#[command(name = "api")]
#[command(about = "Stage counter and leaderboard API server")]
struct Args {
    /// Validate configuration and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    if args.check_config {
        println!("configuration ok (store: {:?})", config.store);
        return Ok(());
    }

    // Initialize Sentry for error tracking (must be done early, guard must stay alive)
    let _sentry_guard = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(config.env.clone().into()),
                ..Default::default()
            },
        ))
    });

    // Set up tracing: JSON in production, human-readable otherwise
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }

    let stores = match config.store {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory stores; scores are lost on restart");
            Stores::memory()
        }
        StoreBackend::Redis => {
            let url = config.redis_url.as_deref().unwrap_or_default();
            tracing::info!(timeout = ?config.redis_timeout(), "Using Redis stores");
            Stores::redis(redis::Client::open(url)?, config.redis_timeout())
        }
    };

    let repos = match &config.database_url {
        Some(url) => {
            let database = PgPoolOptions::new()
                .max_connections(25)
                .connect(url)
                .await?;
            Some(Repos::postgres(database))
        }
        None => {
            tracing::warn!("LEADERBOARD_DATABASE_URL not set; user endpoints disabled");
            None
        }
    };

    let state = AppState {
        config: config.clone(),
        stores,
        repos,
    };

    // Request ID header name
    let x_request_id = http::HeaderName::from_static("x-request-id");

    let app = Router::new()
        .merge(handlers::health::router())
        .merge(handlers::users::router())
        .merge(handlers::ranking::router())
        .nest("/stage", handlers::stages::router())
        .nest("/balance", handlers::balance::router())
        .with_state(state)
        // Request ID: generate UUID, include in logs, return in response
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            },
        ))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024)); // 2MB limit, balance documents are up to 1MB

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
