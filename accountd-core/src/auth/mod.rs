//! Session tokens and the login/logout flow built on them.

mod models;
mod session;
mod token;

pub use models::{LoginRequest, LogoutResponse, RevokedToken, SessionToken, TokenClaims};
pub use session::SessionManager;
pub use token::{bearer_token, TokenService, TOKEN_TTL_HOURS};
