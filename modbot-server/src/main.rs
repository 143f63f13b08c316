use anyhow::{Context, Result};
use axum::{http::StatusCode, response::Json, routing::get, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};

use modbot_server::config::Config;
use modbot_server::webhook::webhook_router;
use modbot_server::{AppState, Engine, EngineConfig, HttpPlatform, HttpScorer};

async fn health_check() -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "modbot"
    })))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting moderation bot");

    let config = Config::from_env().context("failed to load configuration from environment")?;

    let platform = Arc::new(HttpPlatform::new(
        config.platform_api_base.clone(),
        config.platform_token.clone(),
    )?);
    let scorer = Arc::new(HttpScorer::new(
        config.scoring_api_base.clone(),
        config.scoring_api_key.clone(),
    )?);

    let engine = Engine::new(platform, scorer, EngineConfig::from(&config));

    let app_state = Arc::new(AppState {
        engine: Mutex::new(engine),
        webhook_secret: config.webhook_secret.clone(),
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(webhook_router(app_state.clone()))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state.clone());

    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Server listening on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
