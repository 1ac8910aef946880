//! HTTP API serving Billboard charts enriched with music videos.

pub mod app;
pub mod cache;
pub mod config;
pub mod provider;
pub mod routes;
pub mod youtube;

pub use app::{AppState, build_app, build_router};
pub use config::ServerConfig;
