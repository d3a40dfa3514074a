//! Trip planning against a third-party directions provider, plus saved routes.

pub mod directions;
pub mod service;

pub use directions::{
    DirectionsProvider, GoogleDirections, PlanRequest, PlannedRoute, RouteStep,
};
pub use service::{ComparedRoute, RouteComparison, RoutePlanningService, SaveRouteRequest};
