//! Login and logout.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::models::{LogoutResponse, SessionToken};
use super::token::{bearer_token, TokenService};
use crate::error::{AccountError, Result};
use crate::store::UserStore;
use crate::user::PasswordPolicy;

#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    passwords: PasswordPolicy,
}

impl SessionManager {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self {
            users,
            tokens,
            passwords: PasswordPolicy::default(),
        }
    }

    pub fn with_password_policy(mut self, passwords: PasswordPolicy) -> Self {
        self.passwords = passwords;
        self
    }

    /// Exchange credentials for a session token.
    ///
    /// Every failure, unknown email and wrong password alike, is reported as
    /// [`AccountError::LoginFailed`] so callers cannot tell which accounts exist.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionToken> {
        let user = match self.users.find_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("login failed: no such user");
                return Err(AccountError::LoginFailed);
            }
            Err(e) => {
                warn!(error = %e, "login failed: user lookup error");
                return Err(AccountError::LoginFailed);
            }
        };

        match self.passwords.verify(password, &user.password_hash).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = %user.id, "login failed: invalid password");
                return Err(AccountError::LoginFailed);
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "login failed: password check error");
                return Err(AccountError::LoginFailed);
            }
        }

        let token = self.tokens.issue(&user.id, &user.email).map_err(|e| {
            warn!(user_id = %user.id, error = %e, "login failed: token signing error");
            AccountError::LoginFailed
        })?;
        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// Revoke the bearer token in `auth_header`. The token does not have to be
    /// valid any more; an expired or nearly expired token can still be revoked.
    #[instrument(skip(self, auth_header))]
    pub async fn logout(&self, auth_header: Option<&str>) -> Result<LogoutResponse> {
        let token = bearer_token(auth_header)?;
        self.tokens.revoke(token).await?;
        info!("session token revoked");
        Ok(LogoutResponse { success: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::user::{CreateUserRequest, UserManager};
    use chrono::Duration;

    const STRONG: &str = "s3tIt0nF!re&Play1tWithYourT33th";

    struct Fixture {
        users: UserManager,
        sessions: SessionManager,
        tokens: TokenService,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let policy = PasswordPolicy::with_cost(4);
        let tokens = TokenService::new("test-secret", Arc::new(store.clone()));
        Fixture {
            users: UserManager::new(Arc::new(store.clone())).with_password_policy(policy),
            sessions: SessionManager::new(Arc::new(store), tokens.clone())
                .with_password_policy(policy),
            tokens,
        }
    }

    async fn register(fx: &Fixture) -> String {
        fx.users
            .create_user(CreateUserRequest {
                name: "Leo Fender".into(),
                email: "leo@fender.com".into(),
                password: STRONG.into(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn login_issues_token_for_the_user() {
        let fx = fixture();
        let id = register(&fx).await;

        let token = fx.sessions.login("leo@fender.com", STRONG).await.unwrap();
        let claims = fx
            .tokens
            .verify(Some(&format!("Bearer {}", token.access_token)), &id)
            .await
            .unwrap();
        assert_eq!(claims.subject, "leo@fender.com");
    }

    #[tokio::test]
    async fn login_email_lookup_ignores_case() {
        let fx = fixture();
        register(&fx).await;
        assert!(fx.sessions.login("LEO@fender.com", STRONG).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let fx = fixture();
        register(&fx).await;

        let wrong_password = fx
            .sessions
            .login("leo@fender.com", "not-the-password")
            .await
            .unwrap_err();
        let unknown_user = fx
            .sessions
            .login("nobody@fender.com", STRONG)
            .await
            .unwrap_err();
        assert_eq!(wrong_password, AccountError::LoginFailed);
        assert_eq!(wrong_password, unknown_user);
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn deleted_user_cannot_log_in() {
        let fx = fixture();
        let id = register(&fx).await;
        fx.users.delete_user(&id).await.unwrap();
        assert_eq!(
            fx.sessions.login("leo@fender.com", STRONG).await,
            Err(AccountError::LoginFailed)
        );
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let fx = fixture();
        let id = register(&fx).await;
        let token = fx.sessions.login("leo@fender.com", STRONG).await.unwrap();
        let header = format!("Bearer {}", token.access_token);

        let response = fx.sessions.logout(Some(&header)).await.unwrap();
        assert!(response.success);
        assert_eq!(
            fx.tokens.verify(Some(&header), &id).await,
            Err(AccountError::TokenRevoked)
        );
    }

    #[tokio::test]
    async fn logout_accepts_expired_token() {
        let fx = fixture();
        let id = register(&fx).await;
        let expired = fx
            .tokens
            .clone()
            .with_ttl(Duration::hours(-1))
            .issue(&id, "leo@fender.com")
            .unwrap();
        let header = format!("Bearer {}", expired.access_token);

        assert!(fx.sessions.logout(Some(&header)).await.unwrap().success);
        assert_eq!(
            fx.tokens.verify(Some(&header), &id).await,
            Err(AccountError::TokenRevoked)
        );
    }

    #[tokio::test]
    async fn logout_without_header_fails() {
        let fx = fixture();
        assert_eq!(
            fx.sessions.logout(None).await,
            Err(AccountError::MissingAuthHeader)
        );
        assert_eq!(
            fx.sessions.logout(Some("Token abc")).await,
            Err(AccountError::MissingAuthHeader)
        );
    }
}
