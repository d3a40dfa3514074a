//! Repository implementations for all Busway entities.

pub mod bus_route;
pub mod journey;
pub mod notification;
pub mod post;
pub mod preference;
pub mod review;
pub mod saved_route;
pub mod user;

pub use bus_route::BusRouteRepository;
pub use journey::JourneyRepository;
pub use notification::NotificationRepository;
pub use post::{PostRepository, ReportOutcome};
pub use preference::PreferenceRepository;
pub use review::ReviewRepository;
pub use saved_route::SavedRouteRepository;
pub use user::UserRepository;
