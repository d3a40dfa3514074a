//! # busway-entity
//!
//! Domain entity models for Busway. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`; closed sets map to Postgres enum types.
//!
//! Pure domain rules (moderation thresholds, the trending score, the
//! review edit window, preference resolution, the notification delivery
//! state machine) live next to the entities they govern.

pub mod journey;
pub mod notification;
pub mod post;
pub mod review;
pub mod route;
pub mod user;
