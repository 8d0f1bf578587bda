//! In-process store: both tables live behind one lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{
    email_key, RevokedTokenStore, StoreError, StoreResult, UserStore, UserTransaction,
};
use crate::auth::RevokedToken;
use crate::user::User;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    revoked_tokens: HashMap<String, DateTime<Utc>>,
}

impl Tables {
    fn email_taken(&self, email: &str, except_id: Option<&str>) -> bool {
        let key = email_key(email);
        self.users
            .values()
            .any(|u| Some(u.id.as_str()) != except_id && email_key(&u.email) == key)
    }
}

/// Storage adapter keeping everything in memory. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn find_by_id_with_deleted(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let key = email_key(email);
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| !u.is_deleted() && email_key(&u.email) == key)
            .cloned())
    }

    async fn insert(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user id {}", user.id)));
        }
        if tables.email_taken(&user.email, None) {
            return Err(StoreError::Conflict(format!("email {}", user.email)));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn save(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let live = tables.users.get(&user.id).is_some_and(|u| !u.is_deleted());
        if !live {
            return Err(StoreError::NotFound(format!("user id {}", user.id)));
        }
        if tables.email_taken(&user.email, Some(&user.id)) {
            return Err(StoreError::Conflict(format!("email {}", user.email)));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn begin(&self) -> StoreResult<Box<dyn UserTransaction>> {
        Ok(Box::new(MemoryTransaction {
            tables: Arc::clone(&self.tables),
            staged: Vec::new(),
        }))
    }
}

#[derive(Debug)]
enum StagedWrite {
    SoftDelete { id: String, at: DateTime<Utc> },
}

struct MemoryTransaction {
    tables: Arc<RwLock<Tables>>,
    staged: Vec<StagedWrite>,
}

#[async_trait]
impl UserTransaction for MemoryTransaction {
    async fn soft_delete(&mut self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        self.staged.push(StagedWrite::SoftDelete {
            id: id.to_string(),
            at,
        });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction { tables, staged } = *self;
        let mut tables = tables.write().await;
        // Check every write before touching anything so a failure applies none.
        for write in &staged {
            match write {
                StagedWrite::SoftDelete { id, .. } => {
                    let live = tables.users.get(id).is_some_and(|u| !u.is_deleted());
                    if !live {
                        return Err(StoreError::NotFound(format!("user id {id}")));
                    }
                }
            }
        }
        for write in staged {
            match write {
                StagedWrite::SoftDelete { id, at } => {
                    if let Some(user) = tables.users.get_mut(&id) {
                        user.deleted_at = Some(at);
                        user.updated_at = at;
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RevokedTokenStore for MemoryStore {
    async fn insert(&self, token: &RevokedToken) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .revoked_tokens
            .insert(token.token.clone(), token.created_at);
        Ok(())
    }

    async fn contains(&self, token: &str) -> StoreResult<bool> {
        Ok(self.tables.read().await.revoked_tokens.contains_key(token))
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.revoked_tokens.len();
        tables.revoked_tokens.retain(|_, created_at| *created_at >= cutoff);
        Ok((before - tables.revoked_tokens.len()) as u64)
    }
}
