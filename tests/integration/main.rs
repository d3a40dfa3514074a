//! HTTP integration tests against the full router.
//!
//! The pool connects lazily to an unreachable address, so every test here
//! exercises behavior that is decided before the database is touched.

mod auth_test;
mod health_test;
mod helpers;
mod routing_test;
