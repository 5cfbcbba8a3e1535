use std::sync::Arc;

use delivery_dispatch::api;
use delivery_dispatch::config::Config;
use delivery_dispatch::engine::assignment::run_assignment_engine;
use delivery_dispatch::error::AppError;
use delivery_dispatch::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let (app_state, delivery_rx) =
        AppState::new(config.delivery_queue_size, config.event_buffer_size);
    let shared_state = Arc::new(app_state.with_assignment_retry(config.assignment_retry));

    let app = api::rest::router(shared_state.clone());

    tokio::spawn(run_assignment_engine(shared_state.clone(), delivery_rx));

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
