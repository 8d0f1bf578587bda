use accountd_core::{SessionManager, TokenService, UserManager};
use std::sync::Arc;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_manager: Arc<UserManager>,
    pub session_manager: Arc<SessionManager>,
    /// Verifies bearer tokens on the per-user routes
    pub token_service: Arc<TokenService>,
}
