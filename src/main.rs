//! Stress Monitor entrypoint: load config and model, then serve the HTTP API
//! until Ctrl+C. A missing or broken model artifact is not fatal; the service
//! answers with fallback predictions.

use stress_monitor::{
    api::{create_router, AppState},
    config::ServiceConfig,
    error::ServiceError,
    logging::StructuredLogger,
    service::ClassificationService,
};
use std::path::PathBuf;
use tracing::info;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    let config_path = std::env::var("STRESS_MONITOR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = ServiceConfig::load(&config_path).with_env_overrides();

    StructuredLogger::init(&config.log);

    info!(
        config = %config_path.display(),
        model = %config.model_path.display(),
        history = %config.history.path.display(),
        "stress monitor starting"
    );

    let service = ClassificationService::from_config(&config);
    let app = create_router(AppState::new(service));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServiceError::Server(e.to_string()))?;

    info!("stress monitor stopped");
    Ok(())
}
