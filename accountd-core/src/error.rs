use thiserror::Error;

/// Common result type for core operations.
pub type Result<T> = std::result::Result<T, AccountError>;

/// Every failure the core can report. Messages are safe to show to a client;
/// storage-internal detail is logged, never carried here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("invalid or malformed email {0}")]
    MalformedEmail(String),
    #[error("invalid email {0}, is aliased")]
    AliasedEmail(String),
    #[error("prohibited email {0}, domain is disallowed")]
    ProhibitedDomain(String),
    #[error("password does not meet strength threshold")]
    InsecurePassword,
    #[error("invalid name {0}, contains disallowed characters")]
    InvalidName(String),
    #[error("error saving user with email {0}, reason unknown or user with that email may already exist")]
    SaveFailed(String),
    #[error("user ID {0} not found")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("login failed")]
    LoginFailed,
    #[error("missing authorization header")]
    MissingAuthHeader,
    #[error("token not signed as expected")]
    BadSignature,
    #[error("unable to parse token: {0}")]
    MalformedToken(String),
    #[error("token expired")]
    TokenExpired,
    #[error("token subject does not match the requested user")]
    SubjectMismatch,
    #[error("token has been revoked")]
    TokenRevoked,
    #[error("revoked token check failed, please retry")]
    BlacklistCheckFailed,
    #[error("logout failed")]
    RevocationFailed,
    #[error("password hashing failed: {0}")]
    HashingError(String),
}

impl AccountError {
    /// Stable machine-readable kind, independent of the message text.
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::MalformedEmail(_) => "MalformedEmail",
            AccountError::AliasedEmail(_) => "AliasedEmail",
            AccountError::ProhibitedDomain(_) => "ProhibitedDomain",
            AccountError::InsecurePassword => "InsecurePassword",
            AccountError::InvalidName(_) => "InvalidName",
            AccountError::SaveFailed(_) => "SaveFailed",
            AccountError::NotFound(_) => "NotFound",
            AccountError::Unauthorized(_) => "Unauthorized",
            AccountError::LoginFailed => "LoginFailed",
            AccountError::MissingAuthHeader => "MissingAuthHeader",
            AccountError::BadSignature => "BadSignature",
            AccountError::MalformedToken(_) => "MalformedToken",
            AccountError::TokenExpired => "TokenExpired",
            AccountError::SubjectMismatch => "SubjectMismatch",
            AccountError::TokenRevoked => "TokenRevoked",
            AccountError::BlacklistCheckFailed => "BlacklistCheckFailed",
            AccountError::RevocationFailed => "RevocationFailed",
            AccountError::HashingError(_) => "HashingError",
        }
    }
}
