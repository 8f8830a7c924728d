//! HTTP API: router, auth gate middleware, resource handlers and the
//! real-time WebSocket endpoint.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;

pub use app::{AppServices, build_app, build_app_with};
pub use config::ApiConfig;
