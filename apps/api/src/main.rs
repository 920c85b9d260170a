//! Rolewarden API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use rolewarden_core::AppError;
use tracing::{info, warn};

use crate::api_config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let pool = api_services::connect_and_migrate(config.database_url.as_str()).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let engine = api_services::start_protection_engine(pool.clone(), &config).await?;

    let app_state = AppState {
        protection_admin_service: engine.protection_admin_service.clone(),
        gateway_session: engine.gateway_session.clone(),
        postgres_pool: pool,
        admin_api_token: config.admin_api_token.clone(),
        gateway_bridge_secret: config.gateway_bridge_secret.clone(),
    };
    let app = api_router::build_router(app_state, config.admin_cors_origin.as_deref())?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "rolewarden-api listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")));

    if let Err(error) = engine.shutdown().await {
        warn!(%error, "protection engine shutdown failed");
    }
    info!("rolewarden-api stopped");

    served
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
