//! Accounts: registration and login, self-service profile, admin user management.

pub mod admin;
pub mod auth;
pub mod service;

pub use admin::AdminUserService;
pub use auth::{AuthService, AuthSession};
pub use service::{UpdateProfileRequest, UserService};
