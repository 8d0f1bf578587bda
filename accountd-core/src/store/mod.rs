//! Storage capability consumed by the lifecycle, session and token components.
//!
//! The core never talks to a database directly. Everything it needs from
//! persistence is expressed by the traits below, so the managers can be built
//! on top of [`MemoryStore`] in tests and [`FileStore`] (or any other adapter)
//! in a deployment.

mod file;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::RevokedToken;
use crate::user::User;

pub use file::FileStore;
pub use memory::MemoryStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by storage adapters. These stay inside the core: callers
/// translate them into client-safe [`crate::AccountError`] kinds.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The row a write targeted does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend could not serve the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Persistence of user records.
///
/// Email uniqueness is the adapter's job and is compared case-insensitively
/// across every stored row, soft-deleted ones included.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a live (not soft-deleted) user.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    /// Fetch a user regardless of its soft-delete marker.
    async fn find_by_id_with_deleted(&self, id: &str) -> StoreResult<Option<User>>;

    /// Fetch a live user by email, ignoring case.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Store a new user. Fails with [`StoreError::Conflict`] when the email is taken.
    async fn insert(&self, user: &User) -> StoreResult<()>;

    /// Overwrite an existing live user. A missing or soft-deleted row is
    /// [`StoreError::NotFound`], so a stale copy cannot undo a delete.
    async fn save(&self, user: &User) -> StoreResult<()>;

    /// Open an all-or-nothing unit of work.
    async fn begin(&self) -> StoreResult<Box<dyn UserTransaction>>;
}

/// Staged writes against the user store.
///
/// Nothing is visible to other readers until [`UserTransaction::commit`]
/// succeeds. Dropping the transaction without committing discards every
/// staged write.
#[async_trait]
pub trait UserTransaction: Send {
    /// Stage a soft delete of a live user.
    async fn soft_delete(&mut self, id: &str, at: DateTime<Utc>) -> StoreResult<()>;

    /// Apply every staged write, or none of them.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Persistence of the token revocation list.
#[async_trait]
pub trait RevokedTokenStore: Send + Sync {
    async fn insert(&self, token: &RevokedToken) -> StoreResult<()>;

    async fn contains(&self, token: &str) -> StoreResult<bool>;

    /// Remove entries created strictly before `cutoff`, returning how many went.
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}

/// Case-folded key used for email uniqueness and lookups.
pub(crate) fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}
