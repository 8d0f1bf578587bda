mod auth;
mod health;
mod users;
mod validation;

pub use auth::{login, logout};
pub use health::{handler_404, health};
pub use users::{create_user, delete_user, get_user, update_user};
pub use validation::{password_strength, validate_email};
