//! User domain entities.

pub mod model;
pub mod role;
pub mod theme;

pub use model::{CreateUser, User, UserStats};
pub use role::UserRole;
pub use theme::Theme;
