//! Session tokens: issue, verify, revoke.
//!
//! A token moves from issued to valid, then ends either expired (its `exp`
//! passed) or revoked (listed in the revocation store). Both ends are terminal.

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, info, instrument, warn};

use super::models::{RevokedToken, SessionToken, TokenClaims};
use crate::error::{AccountError, Result};
use crate::store::{RevokedTokenStore, StoreResult};

/// Maximum lifetime of a session token.
pub const TOKEN_TTL_HOURS: i64 = 12;

/// Algorithm used when signing.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS512;

/// `exp` is whole seconds and stays valid through its final second, so a
/// revocation must outlive the token lifetime by this much.
const EXPIRY_GRANULARITY_SECS: i64 = 1;

/// Extract the token from an `Authorization: Bearer <token>` value.
/// The scheme keyword is matched case-insensitively.
pub fn bearer_token(auth_header: Option<&str>) -> Result<&str> {
    let (scheme, token) = auth_header
        .map(str::trim)
        .and_then(|v| v.split_once(' '))
        .ok_or(AccountError::MissingAuthHeader)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer")
        || token.is_empty()
        || token.contains(char::is_whitespace)
    {
        return Err(AccountError::MissingAuthHeader);
    }
    Ok(token)
}

#[derive(Clone)]
pub struct TokenService {
    signing_secret: String,
    ttl: Duration,
    revoked: Arc<dyn RevokedTokenStore>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(signing_secret: impl Into<String>, revoked: Arc<dyn RevokedTokenStore>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
            revoked,
        }
    }

    /// Override the token lifetime. Revocations are swept once older than this.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for the given user, valid for the configured lifetime.
    pub fn issue(&self, user_id: &str, email: &str) -> Result<SessionToken> {
        let now = Utc::now();
        let expiry = now + self.ttl;
        let claims = TokenClaims {
            id: user_id.to_string(),
            subject: email.to_string(),
            expires_at: expiry,
            exp: expiry.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.signing_secret.as_bytes()),
        )
        .map_err(|e| AccountError::MalformedToken(format!("signing failed: {e}")))?;

        Ok(SessionToken {
            access_token,
            token_type: "Bearer".to_string(),
            issued_at: now,
            expiry,
        })
    }

    /// Check signature, algorithm and expiry, returning the claims.
    /// Does not consult the revocation list.
    pub fn decode(&self, token: &str) -> Result<TokenClaims> {
        // Only the signing algorithm verifies; HS256/HS384 headers are rejected.
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;

        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.signing_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat => AccountError::BadSignature,
            ErrorKind::ExpiredSignature => AccountError::TokenExpired,
            _ => AccountError::MalformedToken(e.to_string()),
        })
    }

    /// Whether the token is on the revocation list. A failed lookup is not a "no".
    pub async fn is_revoked(&self, token: &str) -> Result<bool> {
        self.revoked.contains(token).await.map_err(|e| {
            warn!(error = %e, "revoked token lookup failed");
            AccountError::BlacklistCheckFailed
        })
    }

    /// Authorize a request for `expected_user_id`.
    ///
    /// Checks run in order: header shape, revocation list, signature and
    /// expiry, then subject. The first failing check decides the error.
    #[instrument(skip(self, auth_header))]
    pub async fn verify(
        &self,
        auth_header: Option<&str>,
        expected_user_id: &str,
    ) -> Result<TokenClaims> {
        let token = bearer_token(auth_header)?;

        if self.is_revoked(token).await? {
            debug!("rejected revoked token");
            return Err(AccountError::TokenRevoked);
        }

        let claims = self.decode(token)?;
        if claims.id != expected_user_id {
            return Err(AccountError::SubjectMismatch);
        }
        Ok(claims)
    }

    /// Put a token on the revocation list, then evict stale entries.
    ///
    /// The token does not need to be valid. A failed sweep is logged and does
    /// not fail the revocation.
    #[instrument(skip(self, token))]
    pub async fn revoke(&self, token: &str) -> Result<()> {
        let record = RevokedToken {
            token: token.to_string(),
            created_at: Utc::now(),
        };
        self.revoked.insert(&record).await.map_err(|e| {
            warn!(error = %e, "failed to record revoked token");
            AccountError::RevocationFailed
        })?;

        match self.sweep().await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "evicted stale revoked tokens"),
            Err(e) => warn!(error = %e, "revoked token sweep failed"),
        }
        Ok(())
    }

    /// Drop revocations older than the token lifetime; those tokens have
    /// expired on their own by now.
    pub async fn sweep(&self) -> StoreResult<u64> {
        let cutoff = Utc::now() - self.ttl - Duration::seconds(EXPIRY_GRANULARITY_SECS);
        self.revoked.delete_created_before(cutoff).await
    }
}
