// src/api/handlers.rs

use crate::api::{auth, types::*, ApiState};
use crate::core::orchestrator::AuditorState;
use crate::core::types::Session;
use crate::infra::errors::AuditorError;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn map_error(e: AuditorError) -> ApiError {
    match e {
        AuditorError::Validation(v) => error(StatusCode::UNPROCESSABLE_ENTITY, v.to_string()),
        AuditorError::SessionNotFound { .. } => error(StatusCode::NOT_FOUND, e.to_string()),
        other => {
            tracing::error!("API request failed: {other}");
            error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

fn not_found(id: &str) -> ApiError {
    error(StatusCode::NOT_FOUND, format!("Session '{id}' not found"))
}

/// GET /api/v1/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// GET /api/v1/state — Current session, history, in-flight flag, disclaimer.
pub async fn get_state(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<AuditorState>, ApiError> {
    auth::check_auth(&state, &headers)?;
    Ok(Json(state.orchestrator.state().await))
}

/// GET /api/v1/sessions
pub async fn list_sessions(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Session>>, ApiError> {
    auth::check_auth(&state, &headers)?;
    Ok(Json(state.orchestrator.sessions().await))
}

/// POST /api/v1/sessions — Submit a narrative and wait for its analysis.
pub async fn create_session(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    auth::check_auth(&state, &headers)?;

    if !state.orchestrator.disclaimer_accepted().await {
        return Err(error(
            StatusCode::FORBIDDEN,
            "The disclaimer must be accepted before submitting",
        ));
    }

    let session = state
        .orchestrator
        .submit(&body.narrative, body.images)
        .await
        .map_err(map_error)?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// DELETE /api/v1/sessions — Clear all history.
pub async fn clear_sessions(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    auth::check_auth(&state, &headers)?;
    state.orchestrator.clear_all().await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    auth::check_auth(&state, &headers)?;
    state
        .orchestrator
        .session(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    auth::check_auth(&state, &headers)?;
    if state.orchestrator.delete_session(&id).await {
        Ok(Json(DeletedResponse { deleted: true }))
    } else {
        Err(not_found(&id))
    }
}

/// POST /api/v1/sessions/{id}/analyze — Re-run analysis on an existing session.
pub async fn analyze_session(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    auth::check_auth(&state, &headers)?;
    state
        .orchestrator
        .analyze_session(&id)
        .await
        .map(Json)
        .map_err(map_error)
}

/// GET /api/v1/sessions/{id}/sections
pub async fn get_sections(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SectionsResponse>, ApiError> {
    auth::check_auth(&state, &headers)?;
    let session = state
        .orchestrator
        .session(&id)
        .await
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(SectionsResponse::from_session(&session)))
}

/// PUT /api/v1/disclaimer
pub async fn set_disclaimer(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<DisclaimerRequest>,
) -> Result<Json<DisclaimerRequest>, ApiError> {
    auth::check_auth(&state, &headers)?;
    state.orchestrator.set_disclaimer_accepted(body.accepted).await;
    Ok(Json(body))
}

/// GET /api/v1/connection — Probe the remote analysis endpoint.
pub async fn check_connection(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<ConnectionResponse>, ApiError> {
    auth::check_auth(&state, &headers)?;
    Ok(Json(ConnectionResponse {
        reachable: state.orchestrator.test_connection().await,
    }))
}
