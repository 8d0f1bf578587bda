//! User data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Stored user account, password hash included. Never hand this to a client;
/// convert to [`UserSummary`] first.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique id (UUID v4), generated at creation
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email, unique ignoring case
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete marker
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// CreateUser command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// UpdateUser command. Absent (or empty) fields are left untouched.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

impl UpdateUserRequest {
    /// Drop fields that carry no value so that `""` behaves like an omitted field.
    pub(super) fn normalized(self) -> Self {
        fn present(field: Option<String>) -> Option<String> {
            field.filter(|s| !s.is_empty())
        }
        Self {
            name: present(self.name),
            email: present(self.email),
            old_password: present(self.old_password),
            new_password: present(self.new_password),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.old_password.is_none()
            && self.new_password.is_none()
    }
}

/// Client-facing view of a user (no sensitive fields)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// DeleteUser result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedUser {
    pub id: String,
}

/// ValidateEmail command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateEmailRequest {
    pub email: String,
}

/// ValidateEmail result: the first failed rule is reported, not raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateEmailResponse {
    pub email: String,
    pub is_valid: bool,
    pub error: String,
}

/// PasswordStrength command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordStrengthRequest {
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordStrengthResponse {
    pub strength: u8,
}
