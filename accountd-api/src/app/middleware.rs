use std::future::Future;
use std::pin::Pin;

use axum::extract::{FromRequestParts, Path};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::ApiError;
use super::state::AppState;

/// Extractor for the `/users/:id` routes: the bearer token must be valid,
/// not revoked, and issued to the user named by `:id`.
#[derive(Debug, Clone)]
pub struct AuthorizedUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthorizedUser {
    type Rejection = ApiError;

    fn from_request_parts<'a, 'b, 'c>(
        parts: &'a mut Parts,
        state: &'b AppState,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'c>>
    where
        'a: 'c,
        'b: 'c,
    {
        Box::pin(async move {
            let Path(user_id) = Path::<String>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::bad_request("invalid user id"))?;

            let header = parts
                .headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            let claims = state.token_service.verify(header, &user_id).await?;
            tracing::debug!(user_id = %claims.id, "bearer token accepted");
            Ok(AuthorizedUser { user_id })
        })
    }
}
