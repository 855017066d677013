//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{OpenAiSuggestionAdapter, OpenAiTownInfoAdapter},
    config::{Config, ConfigError},
    error::ApiError,
    web::{
        health_handler, rest::ApiDoc, state::AppState, suggestions_handler, town_info_handler,
        ws_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let suggestion_adapter = Arc::new(OpenAiSuggestionAdapter::new(
        openai_client.clone(),
        config.suggestion_model.clone(),
        config.town_name.clone(),
    ));
    let town_info_adapter = Arc::new(OpenAiTownInfoAdapter::new(
        openai_client.clone(),
        config.town_info_model.clone(),
        config.town_name.clone(),
    ));
    info!(
        "Suggestions via '{}', town info via '{}' for {}.",
        config.suggestion_model, config.town_info_model, config.town_name
    );

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        suggestion_adapter,
        town_info_adapter,
    });

    let allowed_origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid ALLOWED_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/health", get(health_handler))
        .route("/suggestions", post(suggestions_handler))
        .route("/town-info", get(town_info_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
