//! Login and logout handlers

use accountd_core::{LoginRequest, LogoutResponse, SessionToken};
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;

use super::super::error::ApiError;
use super::super::state::AppState;

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionToken>, ApiError> {
    let token = state
        .session_manager
        .login(&req.email, &req.password)
        .await?;
    Ok(Json(token))
}

/// POST /auth/logout - revoke the bearer token sent with the request
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, ApiError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let response = state.session_manager.logout(header).await?;
    Ok(Json(response))
}
