use std::sync::Arc;

pub mod core;
pub mod error_handler;
pub mod routes;

use ai_llm_service::{LlmAnswerService, config::default_config::config_from_env};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    core::{
        app_state::{AppConfig, AppState},
        http::cors,
    },
    error_handler::AppError,
    routes::{
        answer::answer_route::answer_question, convert_json_route::convert_json,
        debug::debug_route::debug_function, home_route::home,
        sum_data_values_route::sum_data_values,
    },
};

/// Builds the application router.
///
/// `/debug/{function_name}` is only routed when `config.debug_endpoints` is set.
pub fn router(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::new()
        .route("/", get(home))
        .route("/api/", post(answer_question))
        .route("/api", post(answer_question))
        .route("/api/sum-data-values", post(sum_data_values))
        .route("/convert-json", post(convert_json));

    if config.debug_endpoints {
        app = app.route("/debug/{function_name}", post(debug_function));
    }

    app.layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors::permissive_with_credentials())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let llm_config = config_from_env()?;
    info!(provider = ?llm_config.provider, model = %llm_config.model, "LLM configured");

    let answerer = LlmAnswerService::new(llm_config)?
        .with_max_attachment_chars(config.max_attachment_chars);
    let state = AppState::new(Arc::new(answerer), &config);
    let app = router(state, &config);

    let listener = tokio::net::TcpListener::bind(&config.api_address)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %config.api_address, debug_endpoints = config.debug_endpoints, "listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
