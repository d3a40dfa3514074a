//! # busway-service
//!
//! Business logic service layer for Busway. Each service orchestrates
//! repositories, delivery transports and credential helpers to implement
//! application-level use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod community;
pub mod context;
pub mod journey;
pub mod notification;
pub mod planning;
pub mod review;
pub mod user;

pub use community::PostService;
pub use context::RequestContext;
pub use journey::JourneyService;
pub use notification::{NotificationDispatcher, NotificationService, RetryPolicy};
pub use planning::RoutePlanningService;
pub use review::ReviewService;
pub use user::{AdminUserService, AuthService, UserService};
