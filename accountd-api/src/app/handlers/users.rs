//! User lifecycle handlers. Everything under `/users/:id` is limited to the
//! user the bearer token was issued to.

use accountd_core::{CreateUserRequest, DeletedUser, UpdateUserRequest, UserSummary};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::error::ApiError;
use super::super::middleware::AuthorizedUser;
use super::super::state::AppState;

/// POST /users - sign up
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let user = state.user_manager.create_user(req).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthorizedUser,
) -> Result<Json<UserSummary>, ApiError> {
    let user = state.user_manager.get_user(&auth.user_id).await?;
    Ok(Json(user.into()))
}

/// PUT /users/:id - partial update; 204 when the body carries no field
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Response, ApiError> {
    let updated = state.user_manager.update_user(&auth.user_id, req).await?;
    Ok(match updated {
        Some(user) => Json(UserSummary::from(user)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthorizedUser,
) -> Result<Json<DeletedUser>, ApiError> {
    let deleted = state.user_manager.delete_user(&auth.user_id).await?;
    Ok(Json(deleted))
}
