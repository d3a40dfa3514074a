//! HTTP request handlers, one module per domain.

pub mod admin;
pub mod auth;
pub mod health;
pub mod notification;
pub mod planning;
pub mod post;
pub mod review;
pub mod route;
pub mod user;
