// src/api/mod.rs — Local HTTP API over the submission pipeline

pub mod auth;
pub mod handlers;
pub mod types;

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::core::orchestrator::AuditOrchestrator;
use crate::infra::config::ApiConfig;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<AuditOrchestrator>,
    pub token: Option<String>,
}

impl ApiState {
    pub fn new(orchestrator: Arc<AuditOrchestrator>, config: &ApiConfig) -> Self {
        Self {
            orchestrator,
            token: config.token.clone().filter(|t| !t.is_empty()),
        }
    }
}

fn cors_layer() -> CorsLayer {
    let origins = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:8081",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:8081",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Build the axum router with all API routes.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/state", get(handlers::get_state))
        .route(
            "/api/v1/sessions",
            get(handlers::list_sessions)
                .post(handlers::create_session)
                .delete(handlers::clear_sessions),
        )
        .route(
            "/api/v1/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/v1/sessions/{id}/analyze", post(handlers::analyze_session))
        .route("/api/v1/sessions/{id}/sections", get(handlers::get_sections))
        .route("/api/v1/disclaimer", put(handlers::set_disclaimer))
        .route("/api/v1/connection", get(handlers::check_connection))
        .layer(cors_layer())
        .with_state(state)
}

/// Start the API server on the given port (runs until the process exits).
pub async fn start_server(config: &ApiConfig, state: ApiState) -> anyhow::Result<()> {
    let addr = format!("127.0.0.1:{}", config.port);
    let router = build_router(state);

    tracing::info!("API server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
