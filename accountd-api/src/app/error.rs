use accountd_core::AccountError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    code: &'static str,
    message: String,
    status: StatusCode,
}

impl ApiError {
    pub fn new(code: &'static str, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BadRequest", StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NotFound", StatusCode::NOT_FOUND, message)
    }
}

fn status_for(err: &AccountError) -> StatusCode {
    match err {
        AccountError::MalformedEmail(_)
        | AccountError::AliasedEmail(_)
        | AccountError::ProhibitedDomain(_)
        | AccountError::InsecurePassword
        | AccountError::InvalidName(_) => StatusCode::BAD_REQUEST,
        // Not 409: a failed save is not known to be a duplicate.
        AccountError::SaveFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AccountError::NotFound(_) => StatusCode::NOT_FOUND,
        AccountError::Unauthorized(_)
        | AccountError::LoginFailed
        | AccountError::MissingAuthHeader
        | AccountError::BadSignature
        | AccountError::MalformedToken(_)
        | AccountError::TokenExpired
        | AccountError::TokenRevoked => StatusCode::UNAUTHORIZED,
        AccountError::SubjectMismatch => StatusCode::FORBIDDEN,
        AccountError::BlacklistCheckFailed => StatusCode::SERVICE_UNAVAILABLE,
        AccountError::RevocationFailed | AccountError::HashingError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        ApiError::new(err.code(), status_for(&err), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "code": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_errors_keep_their_code() {
        let err = ApiError::from(AccountError::TokenRevoked);
        assert_eq!(err.code, "TokenRevoked");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "token has been revoked");

        let err = ApiError::from(AccountError::SaveFailed("leo@fender.com".into()));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            ApiError::from(AccountError::SubjectMismatch).status,
            StatusCode::FORBIDDEN
        );
    }
}
