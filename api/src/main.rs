mod error;
mod routes;
mod state;

use anyhow::Result;
use axum::Router;
use shared::Config;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting trading gym API server...");

    let config = Config::from_env()?;
    let bind_addr = config.api_bind_addr.clone();
    info!("Tickers file: {}", config.tickers_file.display());
    info!("Trade log: {}", config.trade_log.display());
    info!(
        "Trainer: {} {}",
        config.trainer_program,
        config.trainer_args.join(" ")
    );

    let app = app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    routes::api_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
