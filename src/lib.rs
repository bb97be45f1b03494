//! Library crate for scout-relay, exposing modules for binaries and integration tests.

/// Station configuration file.
pub mod config;
/// Persistence and central server access.
pub mod dao;
mod dto;
mod error;
/// HTTP route trees.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared station state and the scoring session model.
pub mod state;
