//! Password policy: strength scoring, hashing and verification.

use bcrypt::{hash, verify};
use zxcvbn::zxcvbn;

use crate::error::{AccountError, Result};

/// Scores below this are insecure: 0 and 1 fall under 10^6 estimated guesses.
pub const INSECURE_PASSWORD_THRESHOLD: u8 = 2;

/// bcrypt cost used for every stored password.
pub const BCRYPT_COST: u32 = 14;

/// bcrypt only reads the first 72 bytes; longer input is refused rather than truncated.
const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

/// Strength threshold plus bcrypt parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    cost: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { cost: BCRYPT_COST }
    }
}

impl PasswordPolicy {
    /// Policy with a custom bcrypt cost. Production code uses [`Default`].
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Guessability score from 0 (trivial) to 4 (very hard).
    pub fn strength(password: &str) -> u8 {
        zxcvbn(password, &[]).score() as u8
    }

    pub fn is_insecure(password: &str) -> bool {
        Self::strength(password) < INSECURE_PASSWORD_THRESHOLD
    }

    /// Reject passwords that do not reach the strength threshold.
    pub fn check_strength(password: &str) -> Result<()> {
        if Self::is_insecure(password) {
            return Err(AccountError::InsecurePassword);
        }
        Ok(())
    }

    /// Salted bcrypt hash, computed on the blocking pool.
    pub async fn hash(&self, password: &str) -> Result<String> {
        if password.len() > BCRYPT_MAX_PASSWORD_BYTES {
            return Err(AccountError::HashingError(format!(
                "password exceeds {BCRYPT_MAX_PASSWORD_BYTES} bytes"
            )));
        }
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AccountError::HashingError(format!("spawn_blocking failed: {e}")))?
            .map_err(|e| AccountError::HashingError(format!("bcrypt hash failed: {e}")))
    }

    /// Check a password against a stored hash (bcrypt compares in constant time).
    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|e| AccountError::HashingError(format!("spawn_blocking failed: {e}")))?
            .map_err(|e| AccountError::HashingError(format!("bcrypt verify failed: {e}")))
    }
}
