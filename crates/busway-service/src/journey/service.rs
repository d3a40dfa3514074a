//! Journey and bus route service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use busway_core::error::AppError;
use busway_database::repositories::{BusRouteRepository, JourneyRepository};
use busway_entity::journey::{CreateJourney, Journey, JourneyStatus};
use busway_entity::notification::{NewNotification, Notification};
use busway_entity::route::{BusRoute, CreateBusRoute};

use super::messages;
use crate::context::RequestContext;
use crate::notification::NotificationDispatcher;

/// Admin request to book a journey for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJourneyRequest {
    /// Traveller.
    pub user_id: Uuid,
    /// Route travelled.
    pub route_id: Uuid,
    /// External booking reference.
    pub booking_id: String,
    /// Departure.
    pub scheduled_date: DateTime<Utc>,
}

/// Bus routes, journeys and admin-triggered notifications.
#[derive(Debug, Clone)]
pub struct JourneyService {
    route_repo: Arc<BusRouteRepository>,
    journey_repo: Arc<JourneyRepository>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl JourneyService {
    /// Creates a new journey service.
    pub fn new(
        route_repo: Arc<BusRouteRepository>,
        journey_repo: Arc<JourneyRepository>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            route_repo,
            journey_repo,
            dispatcher,
        }
    }

    /// Active bus routes.
    pub async fn list_routes(&self) -> Result<Vec<BusRoute>, AppError> {
        self.route_repo.list_active().await
    }

    /// A bus route by ID.
    pub async fn get_route(&self, route_id: Uuid) -> Result<BusRoute, AppError> {
        self.route_repo
            .find_by_id(route_id)
            .await?
            .ok_or_else(|| AppError::not_found("Route not found"))
    }

    /// Adds a bus route. Admin only.
    pub async fn create_route(
        &self,
        ctx: &RequestContext,
        data: CreateBusRoute,
    ) -> Result<BusRoute, AppError> {
        ctx.require_admin()?;
        if data.route_number.trim().is_empty() || data.name.trim().is_empty() {
            return Err(AppError::validation("Route number and name are required"));
        }
        if data.distance_km < 0.0 || data.average_duration_minutes < 0 {
            return Err(AppError::validation("Distance and duration must not be negative"));
        }
        let route = self.route_repo.create(&data).await?;
        info!(route_id = %route.id, route_number = %route.route_number, "Bus route created");
        Ok(route)
    }

    /// The caller's journeys.
    pub async fn my_journeys(&self, ctx: &RequestContext) -> Result<Vec<Journey>, AppError> {
        self.journey_repo.list_by_user(ctx.user_id).await
    }

    /// Books a journey for a user and confirms it. Admin only.
    pub async fn create_journey(
        &self,
        ctx: &RequestContext,
        req: CreateJourneyRequest,
    ) -> Result<Journey, AppError> {
        ctx.require_admin()?;
        if req.booking_id.trim().is_empty() {
            return Err(AppError::validation("Booking ID is required"));
        }
        let route = self.get_route(req.route_id).await?;
        let journey = self
            .journey_repo
            .create(&CreateJourney {
                user_id: req.user_id,
                route_id: req.route_id,
                booking_id: req.booking_id.trim().to_string(),
                scheduled_date: req.scheduled_date,
            })
            .await?;

        info!(journey_id = %journey.id, user_id = %journey.user_id, "Journey booked");
        self.dispatcher
            .dispatch_detached(messages::booking_confirmation(&journey, &route));
        Ok(journey)
    }

    /// Moves a journey's lifecycle state. Admin only.
    pub async fn set_status(
        &self,
        ctx: &RequestContext,
        journey_id: Uuid,
        status: JourneyStatus,
    ) -> Result<Journey, AppError> {
        ctx.require_admin()?;
        let current = self.get_journey(journey_id).await?;
        if current.status == status {
            return Ok(current);
        }
        let journey = self
            .journey_repo
            .set_status(journey_id, status, Utc::now())
            .await?;

        info!(journey_id = %journey.id, status = ?journey.status, "Journey status changed");
        if status == JourneyStatus::Cancelled {
            self.dispatcher
                .dispatch_detached(messages::cancellation(&journey));
        }
        Ok(journey)
    }

    /// Moves a journey's departure. Admin only.
    pub async fn reschedule(
        &self,
        ctx: &RequestContext,
        journey_id: Uuid,
        scheduled_date: DateTime<Utc>,
    ) -> Result<Journey, AppError> {
        ctx.require_admin()?;
        let previous = self.get_journey(journey_id).await?;
        if matches!(
            previous.status,
            JourneyStatus::Completed | JourneyStatus::Cancelled
        ) {
            return Err(AppError::validation("Only upcoming journeys can be rescheduled"));
        }
        let journey = self
            .journey_repo
            .reschedule(journey_id, scheduled_date)
            .await?;

        info!(journey_id = %journey.id, "Journey rescheduled");
        self.dispatcher
            .dispatch_detached(messages::schedule_change(&journey, &previous));
        Ok(journey)
    }

    /// Sends an arbitrary notification through the dispatcher. Admin only.
    pub async fn send_notification(
        &self,
        ctx: &RequestContext,
        request: NewNotification,
    ) -> Result<Notification, AppError> {
        ctx.require_admin()?;
        if request.title.trim().is_empty() || request.message.trim().is_empty() {
            return Err(AppError::validation("Title and message are required"));
        }
        self.dispatcher.dispatch(request).await
    }

    async fn get_journey(&self, journey_id: Uuid) -> Result<Journey, AppError> {
        self.journey_repo
            .find_by_id(journey_id)
            .await?
            .ok_or_else(|| AppError::not_found("Journey not found"))
    }
}
