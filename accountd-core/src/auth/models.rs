use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signed claims of a session token.
///
/// `Id`/`Subject`/`ExpiresAt` are the claims clients and older tokens carry;
/// `exp`/`iat` are the registered claims the JWT validator enforces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject user id
    #[serde(rename = "Id")]
    pub id: String,
    /// Subject email
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "ExpiresAt")]
    pub expires_at: DateTime<Utc>,
    pub exp: i64,
    pub iat: i64,
}

/// A freshly issued bearer token and when it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    pub token_type: String,
    pub issued_at: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
}

/// A token explicitly invalidated before its natural expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedToken {
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// Login command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}
