//! Bus routes, journeys (bookings) and the admin notifications they trigger.

pub mod messages;
pub mod service;

pub use service::{CreateJourneyRequest, JourneyService};
