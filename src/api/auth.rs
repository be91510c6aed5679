// src/api/auth.rs — Optional bearer-token gate for the session API

use crate::api::{types::ErrorResponse, ApiState};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;

/// Token from an `Authorization: Bearer <token>` header. The scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

/// Pass when no token is configured or the request carries the configured one.
pub fn check_auth(
    state: &ApiState,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let Some(expected) = state.token.as_deref() else {
        return Ok(());
    };

    let presented = bearer_token(headers).unwrap_or_default();
    if tokens_match(presented.as_bytes(), expected.as_bytes()) {
        return Ok(());
    }

    tracing::debug!(
        presented = !presented.is_empty(),
        "Rejected session API request"
    );
    Err((
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Session API requires a valid bearer token".into(),
        }),
    ))
}

/// Length check first, then a branch-free byte comparison.
fn tokens_match(presented: &[u8], expected: &[u8]) -> bool {
    presented.len() == expected.len()
        && presented
            .iter()
            .zip(expected)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}
