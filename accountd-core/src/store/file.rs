//! JSON documents on the local filesystem.
//!
//! Layout under the data directory:
//!
//! ```text
//! users/<id>.json        one document per user, soft-deleted ones included
//! users/index.json       case-folded email -> user id
//! revoked_tokens.json    token -> revocation time
//! ```
//!
//! Every document is written to a temp file and renamed into place, so readers
//! never observe a partial write. Mutations hold one async mutex, which makes
//! the email uniqueness check and the write a single step within the process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error};

use super::{
    email_key, RevokedTokenStore, StoreError, StoreResult, UserStore, UserTransaction,
};
use crate::auth::RevokedToken;
use crate::user::User;

type EmailIndex = HashMap<String, String>;
type RevocationTable = HashMap<String, DateTime<Utc>>;

#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create the directory layout if it does not exist yet.
    pub async fn ensure_dirs(&self) -> StoreResult<()> {
        tokio::fs::create_dir_all(self.users_dir()).await?;
        Ok(())
    }

    fn users_dir(&self) -> PathBuf {
        self.data_dir.join("users")
    }

    fn index_path(&self) -> PathBuf {
        self.users_dir().join("index.json")
    }

    fn revoked_tokens_path(&self) -> PathBuf {
        self.data_dir.join("revoked_tokens.json")
    }

    /// Document path for a user id; `None` for anything that is not a UUID,
    /// which keeps caller-supplied ids from escaping the users directory.
    fn user_path(&self, id: &str) -> Option<PathBuf> {
        uuid::Uuid::parse_str(id)
            .ok()
            .map(|_| self.users_dir().join(format!("{id}.json")))
    }

    async fn read_user(&self, id: &str) -> StoreResult<Option<User>> {
        match self.user_path(id) {
            Some(path) => read_json(&path).await,
            None => Ok(None),
        }
    }

    async fn write_user(&self, user: &User) -> StoreResult<()> {
        let path = self
            .user_path(&user.id)
            .ok_or_else(|| StoreError::Unavailable(format!("invalid user id {}", user.id)))?;
        write_json(&path, user).await
    }

    async fn load_index(&self) -> StoreResult<EmailIndex> {
        Ok(read_json(&self.index_path()).await?.unwrap_or_default())
    }

    /// Put back the index after a failed document write. A failure here is
    /// only logged; the original write error is what the caller sees.
    async fn restore_index(&self, index: &EmailIndex) {
        if let Err(e) = write_json(&self.index_path(), index).await {
            error!(error = %e, "failed to restore email index");
        }
    }

    async fn load_revocations(&self) -> StoreResult<RevocationTable> {
        Ok(read_json(&self.revoked_tokens_path())
            .await?
            .unwrap_or_default())
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let data = serde_json::to_vec_pretty(value)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, data).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl UserStore for FileStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.read_user(id).await?.filter(|u| !u.is_deleted()))
    }

    async fn find_by_id_with_deleted(&self, id: &str) -> StoreResult<Option<User>> {
        self.read_user(id).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let index = self.load_index().await?;
        match index.get(&email_key(email)) {
            Some(id) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn insert(&self, user: &User) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.ensure_dirs().await?;

        let mut index = self.load_index().await?;
        let key = email_key(&user.email);
        if index.contains_key(&key) {
            return Err(StoreError::Conflict(format!("email {}", user.email)));
        }
        if self.read_user(&user.id).await?.is_some() {
            return Err(StoreError::Conflict(format!("user id {}", user.id)));
        }

        // Index first: a user document the index does not know about would
        // escape the uniqueness check above.
        index.insert(key.clone(), user.id.clone());
        write_json(&self.index_path(), &index).await?;
        if let Err(e) = self.write_user(user).await {
            index.remove(&key);
            self.restore_index(&index).await;
            return Err(e);
        }
        debug!(user_id = %user.id, "user document written");
        Ok(())
    }

    async fn save(&self, user: &User) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let existing = self
            .read_user(&user.id)
            .await?
            .filter(|u| !u.is_deleted())
            .ok_or_else(|| StoreError::NotFound(format!("user id {}", user.id)))?;

        let old_key = email_key(&existing.email);
        let new_key = email_key(&user.email);
        if old_key == new_key {
            return self.write_user(user).await;
        }

        let previous = self.load_index().await?;
        if previous.get(&new_key).is_some_and(|id| id != &user.id) {
            return Err(StoreError::Conflict(format!("email {}", user.email)));
        }
        let mut index = previous.clone();
        index.remove(&old_key);
        index.insert(new_key, user.id.clone());
        write_json(&self.index_path(), &index).await?;
        if let Err(e) = self.write_user(user).await {
            self.restore_index(&previous).await;
            return Err(e);
        }
        Ok(())
    }

    async fn begin(&self) -> StoreResult<Box<dyn UserTransaction>> {
        Ok(Box::new(FileTransaction {
            store: self.clone(),
            soft_deletes: Vec::new(),
        }))
    }
}

struct FileTransaction {
    store: FileStore,
    soft_deletes: Vec<(String, DateTime<Utc>)>,
}

#[async_trait]
impl UserTransaction for FileTransaction {
    async fn soft_delete(&mut self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        self.soft_deletes.push((id.to_string(), at));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let store = &self.store;
        let _guard = store.write_lock.lock().await;

        let mut updated = Vec::with_capacity(self.soft_deletes.len());
        for (id, at) in &self.soft_deletes {
            let mut user = store
                .read_user(id)
                .await?
                .filter(|u| !u.is_deleted())
                .ok_or_else(|| StoreError::NotFound(format!("user id {id}")))?;
            user.deleted_at = Some(*at);
            user.updated_at = *at;
            updated.push(user);
        }

        for user in &updated {
            store.write_user(user).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RevokedTokenStore for FileStore {
    async fn insert(&self, token: &RevokedToken) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let mut table = self.load_revocations().await?;
        table.insert(token.token.clone(), token.created_at);
        write_json(&self.revoked_tokens_path(), &table).await
    }

    async fn contains(&self, token: &str) -> StoreResult<bool> {
        Ok(self.load_revocations().await?.contains_key(token))
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let _guard = self.write_lock.lock().await;
        let mut table = self.load_revocations().await?;
        let before = table.len();
        table.retain(|_, created_at| *created_at >= cutoff);
        let removed = (before - table.len()) as u64;
        if removed > 0 {
            write_json(&self.revoked_tokens_path(), &table).await?;
        }
        Ok(removed)
    }
}
