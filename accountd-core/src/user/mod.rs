//! User accounts: validation rules, password policy and lifecycle.

pub mod email;
mod manager;
mod models;
pub mod name;
mod password;

pub use email::Email;
pub use manager::UserManager;
pub use models::{
    CreateUserRequest, DeletedUser, PasswordStrengthRequest, PasswordStrengthResponse,
    UpdateUserRequest, User, UserSummary, ValidateEmailRequest, ValidateEmailResponse,
};
pub use password::{PasswordPolicy, BCRYPT_COST, INSECURE_PASSWORD_THRESHOLD};
