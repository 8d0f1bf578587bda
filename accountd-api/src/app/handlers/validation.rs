//! Stateless checks a sign-up form can call before submitting.

use accountd_core::{
    PasswordStrengthRequest, PasswordStrengthResponse, UserManager, ValidateEmailRequest,
    ValidateEmailResponse,
};
use axum::Json;

/// POST /validate/email
pub async fn validate_email(Json(req): Json<ValidateEmailRequest>) -> Json<ValidateEmailResponse> {
    Json(UserManager::validate_email(&req))
}

/// POST /validate/password
pub async fn password_strength(
    Json(req): Json<PasswordStrengthRequest>,
) -> Json<PasswordStrengthResponse> {
    Json(UserManager::password_strength(&req))
}
