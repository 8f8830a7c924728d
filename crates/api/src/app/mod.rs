//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared handles (gate, token issuer, hasher, stores, hub)
//! - `routes/`: HTTP routes + handlers, one file per resource
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use postboard_auth::Role;

use crate::config::ApiConfig;
use crate::middleware::{self, AuthState, RoleState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, AppServicesBuilder};

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = Arc::new(AppServices::from_config(config));
    if let Some(seed) = &config.seed_admin {
        services.seed_admin(seed).await?;
    }
    Ok(build_app_with(services))
}

/// Build the router around already-wired services.
pub fn build_app_with(services: Arc<AppServices>) -> Router {
    let auth_state = AuthState {
        guard: services.guard.clone(),
    };
    let admin_state = RoleState {
        guard: services.guard.clone(),
        allowed: &[Role::Admin],
    };

    // Gated routes: the middleware rejects before any handler (or store) runs.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));
    let admin = routes::admin_router().layer(axum::middleware::from_fn_with_state(
        admin_state,
        middleware::role_middleware,
    ));

    routes::public_router()
        .merge(protected)
        .merge(admin)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
