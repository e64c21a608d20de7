//! Time-tracking API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, demo
//! seeding) so integration tests and the binary entrypoint can share them.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod seed;
pub mod state;
