mod admin;
mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod models;
mod report;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::admin::credentials::bootstrap_default_admin;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{LlmClient, LlmSettings};
use crate::routes::build_router;
use crate::state::{cookie_key, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentScout API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite and the default administrator
    let db = create_pool(&config.database_url).await?;
    if bootstrap_default_admin(&db).await? {
        info!("Default administrator created");
    }

    // Initialize LLM client
    let llm = LlmClient::new(LlmSettings {
        api_key: config.google_api_key.clone(),
        model: config.gemini_model.clone(),
        api_base: config.gemini_api_base.clone(),
        timeout: Duration::from_secs(config.llm_timeout_secs),
        max_retries: config.llm_max_retries,
    })?;
    info!("LLM client initialized (model: {})", llm.model());

    // Build app state
    let state = AppState {
        db,
        llm: Arc::new(llm),
        cookie_key: cookie_key(&config.session_secret),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
