//! Core library for user accounts: validation, password hashing, storage, and
//! session tokens.

mod error;
pub mod auth;
pub mod store;
pub mod user;

pub use auth::{
    bearer_token, LoginRequest, LogoutResponse, SessionManager, SessionToken, TokenClaims,
    TokenService,
};
pub use error::{AccountError, Result};
pub use store::{FileStore, MemoryStore, RevokedTokenStore, StoreError, UserStore};
pub use user::{
    CreateUserRequest, DeletedUser, PasswordPolicy, PasswordStrengthRequest,
    PasswordStrengthResponse, UpdateUserRequest, User, UserManager, UserSummary,
    ValidateEmailRequest, ValidateEmailResponse,
};
