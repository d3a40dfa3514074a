//! Directions provider seam and the Google Directions client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use busway_core::config::MapsConfig;
use busway_core::error::{AppError, ErrorKind};
use busway_entity::route::Location;

/// A trip to plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Origin.
    pub start_location: Location,
    /// Destination.
    pub destination: Location,
    /// Intermediate stops, in order.
    #[serde(default)]
    pub waypoints: Vec<Location>,
}

/// One turn-by-turn step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// Human-readable distance.
    pub distance: String,
    /// Human-readable duration.
    pub duration: String,
    /// Instruction markup from the provider.
    pub instruction: String,
}

/// A planned trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRoute {
    /// Total distance in kilometres, two decimals.
    pub distance_km: f64,
    /// Total duration in whole minutes.
    pub duration_minutes: i64,
    /// Duration with current traffic; equals `duration_minutes` when unknown.
    pub duration_in_traffic_minutes: i64,
    /// Encoded overview polyline.
    pub polyline: String,
    /// Steps across all legs.
    pub steps: Vec<RouteStep>,
}

/// Plans trips between coordinates.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Plan `request`. A provider-side refusal is a validation error.
    async fn plan(&self, request: &PlanRequest) -> Result<PlannedRoute, AppError>;
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<GoogleRoute>,
}

#[derive(Debug, Deserialize)]
struct GoogleRoute {
    overview_polyline: Polyline,
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: TextValue,
    duration: TextValue,
    #[serde(default)]
    duration_in_traffic: Option<TextValue>,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    distance: TextValue,
    duration: TextValue,
    #[serde(default)]
    html_instructions: String,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
    value: i64,
}

impl DirectionsResponse {
    /// Reduce the provider payload to a [`PlannedRoute`].
    pub(crate) fn into_planned(self) -> Result<PlannedRoute, AppError> {
        if self.status != "OK" {
            let detail = self
                .error_message
                .map(|m| format!(": {m}"))
                .unwrap_or_default();
            return Err(AppError::validation(format!(
                "Route planning failed ({}){detail}",
                self.status
            )));
        }
        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| AppError::validation("Route planning failed (ZERO_RESULTS)"))?;

        let meters: i64 = route.legs.iter().map(|l| l.distance.value).sum();
        let seconds: i64 = route.legs.iter().map(|l| l.duration.value).sum();
        let traffic_seconds: i64 = route
            .legs
            .iter()
            .map(|l| {
                l.duration_in_traffic
                    .as_ref()
                    .map_or(l.duration.value, |t| t.value)
            })
            .sum();
        let steps = route
            .legs
            .into_iter()
            .flat_map(|l| l.steps)
            .map(|s| RouteStep {
                distance: s.distance.text,
                duration: s.duration.text,
                instruction: s.html_instructions,
            })
            .collect();

        Ok(PlannedRoute {
            distance_km: (meters as f64 / 10.0).round() / 100.0,
            duration_minutes: (seconds as f64 / 60.0).round() as i64,
            duration_in_traffic_minutes: (traffic_seconds as f64 / 60.0).round() as i64,
            polyline: route.overview_polyline.points,
            steps,
        })
    }
}

/// Google Directions API client.
pub struct GoogleDirections {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for GoogleDirections {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDirections")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GoogleDirections {
    /// Build the client from configuration.
    pub fn new(config: &MapsConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self {
            client,
            base_url: config.directions_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn request_url(&self, request: &PlanRequest) -> Result<reqwest::Url, AppError> {
        let origin = request.start_location.as_query();
        let destination = request.destination.as_query();
        let waypoints = request
            .waypoints
            .iter()
            .map(Location::as_query)
            .collect::<Vec<_>>()
            .join("|");

        let mut params = vec![
            ("origin", origin),
            ("destination", destination),
            ("key", self.api_key.clone()),
        ];
        if !waypoints.is_empty() {
            params.push(("waypoints", waypoints));
        }

        reqwest::Url::parse_with_params(&self.base_url, &params).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid directions URL", e)
        })
    }
}

#[async_trait]
impl DirectionsProvider for GoogleDirections {
    async fn plan(&self, request: &PlanRequest) -> Result<PlannedRoute, AppError> {
        let url = self.request_url(request)?;
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Directions request failed");
            AppError::with_source(ErrorKind::ExternalService, "Directions provider unreachable", e)
        })?;
        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Directions provider returned HTTP {}",
                response.status().as_u16()
            )));
        }
        let body: DirectionsResponse = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Malformed directions response", e)
        })?;
        debug!(status = %body.status, "Directions response received");
        body.into_planned()
    }
}
