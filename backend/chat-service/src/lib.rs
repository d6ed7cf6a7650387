//! Chat service: users, conversations with invitations, messages and
//! presence tracking over a JSON HTTP API.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;
