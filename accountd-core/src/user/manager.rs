//! User manager: create, read, update and soft-delete user records

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use super::email;
use super::models::*;
use super::name::is_valid_name;
use super::password::PasswordPolicy;
use crate::error::{AccountError, Result};
use crate::store::{StoreError, UserStore};

/// User manager
#[derive(Clone)]
pub struct UserManager {
    store: Arc<dyn UserStore>,
    passwords: PasswordPolicy,
}

// ============================================================================
// Construction
// ============================================================================

impl UserManager {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            passwords: PasswordPolicy::default(),
        }
    }

    pub fn with_password_policy(mut self, passwords: PasswordPolicy) -> Self {
        self.passwords = passwords;
        self
    }
}

// ============================================================================
// Internal helpers
// ============================================================================

impl UserManager {
    /// Load a live user. Lookup faults are logged and reported as not found.
    async fn load(&self, id: &str) -> Result<User> {
        match self.store.find_by_id(id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AccountError::NotFound(id.to_string())),
            Err(e) => {
                error!(user_id = %id, error = %e, "user lookup failed");
                Err(AccountError::NotFound(id.to_string()))
            }
        }
    }

    fn check_name(name: &str) -> Result<()> {
        if !is_valid_name(name) {
            return Err(AccountError::InvalidName(name.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Commands
// ============================================================================

impl UserManager {
    /// Create a user.
    ///
    /// Rules run in order: name, email (syntax, alias, domain), password
    /// strength. The first failure is returned.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn create_user(&self, req: CreateUserRequest) -> Result<User> {
        Self::check_name(&req.name)?;
        email::validate(&req.email)?;
        PasswordPolicy::check_strength(&req.password)?;
        let password_hash = self.passwords.hash(&req.password).await?;

        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: req.name,
            email: req.email,
            password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        // A taken email is indistinguishable from any other storage fault here.
        if let Err(e) = self.store.insert(&user).await {
            warn!(error = %e, "failed to save new user");
            return Err(AccountError::SaveFailed(user.email));
        }

        info!(user_id = %user.id, "created user");
        Ok(user)
    }

    /// Get a live user
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<User> {
        self.load(id).await
    }

    /// Apply the supplied fields of `req` to a user.
    ///
    /// Returns `Ok(None)` without writing anything when no field is supplied.
    /// A password change needs both the current password, which must match,
    /// and a new one that passes the strength rule.
    #[instrument(skip(self, req))]
    pub async fn update_user(&self, id: &str, req: UpdateUserRequest) -> Result<Option<User>> {
        let req = req.normalized();
        let mut user = self.load(id).await?;

        if req.is_empty() {
            debug!(user_id = %id, "update without fields, nothing to do");
            return Ok(None);
        }

        if let Some(name) = &req.name {
            Self::check_name(name)?;
        }
        if let Some(new_email) = &req.email {
            email::validate(new_email)?;
        }

        let password_hash = match (req.old_password.as_deref(), req.new_password.as_deref()) {
            (None, None) => None,
            (None, Some(_)) => {
                return Err(AccountError::Unauthorized(
                    "current password is required".into(),
                ))
            }
            (Some(old), new) => {
                if !self.passwords.verify(old, &user.password_hash).await? {
                    warn!(user_id = %id, "password change rejected: wrong current password");
                    return Err(AccountError::Unauthorized(
                        "current password is incorrect".into(),
                    ));
                }
                let new = new.ok_or(AccountError::InsecurePassword)?;
                PasswordPolicy::check_strength(new)?;
                Some(self.passwords.hash(new).await?)
            }
        };

        if let Some(name) = req.name {
            user.name = name;
        }
        if let Some(email) = req.email {
            user.email = email;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();

        match self.store.save(&user).await {
            Ok(()) => {}
            // Deleted since it was loaded; writing the stale copy would undo that.
            Err(StoreError::NotFound(_)) => {
                warn!(user_id = %id, "user deleted during update");
                return Err(AccountError::NotFound(id.to_string()));
            }
            Err(e) => {
                warn!(user_id = %id, error = %e, "failed to save user");
                return Err(AccountError::SaveFailed(user.email));
            }
        }

        info!(user_id = %id, "updated user");
        self.load(id).await.map(Some)
    }

    /// Soft-delete a user inside one transaction, then read it back to make
    /// sure the marker landed.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<DeletedUser> {
        let user = self.load(id).await?;
        let deleted_at = Utc::now();

        // Any early return drops `tx` uncommitted, which discards its writes.
        let committed = async {
            let mut tx = self.store.begin().await?;
            tx.soft_delete(&user.id, deleted_at).await?;
            tx.commit().await
        }
        .await;
        if let Err(e) = committed {
            warn!(user_id = %id, error = %e, "delete transaction rolled back");
            return Err(AccountError::NotFound(id.to_string()));
        }

        match self.store.find_by_id_with_deleted(id).await {
            Ok(Some(stored)) if stored.is_deleted() => {}
            Ok(_) => {
                error!(user_id = %id, "delete committed but user is not marked deleted");
                return Err(AccountError::NotFound(id.to_string()));
            }
            Err(e) => {
                error!(user_id = %id, error = %e, "could not confirm delete");
                return Err(AccountError::NotFound(id.to_string()));
            }
        }

        info!(user_id = %id, "deleted user");
        Ok(DeletedUser { id: user.id })
    }

    /// Run the full email check and report the outcome instead of failing.
    pub fn validate_email(req: &ValidateEmailRequest) -> ValidateEmailResponse {
        let outcome = email::validate(&req.email);
        ValidateEmailResponse {
            email: req.email.clone(),
            is_valid: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()).unwrap_or_default(),
        }
    }

    pub fn password_strength(req: &PasswordStrengthRequest) -> PasswordStrengthResponse {
        PasswordStrengthResponse {
            strength: PasswordPolicy::strength(&req.password),
        }
    }
}
