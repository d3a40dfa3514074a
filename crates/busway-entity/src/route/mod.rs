//! Bus route and saved route entities.

pub mod bus_route;
pub mod saved;

pub use bus_route::{BusRoute, CreateBusRoute, Location, Stop};
pub use saved::{CreateSavedRoute, SavedRoute};
