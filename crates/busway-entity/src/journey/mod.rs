//! Journey (booked trip) entities.

pub mod model;

pub use model::{CreateJourney, Journey, JourneyStatus};
