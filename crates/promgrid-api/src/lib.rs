//! promgrid-api — REST API for the target registry.
//!
//! Provides axum route handlers for registering, querying, and removing
//! monitoring targets. Every mutation goes through the
//! [`TargetRegistry`](promgrid_discovery::TargetRegistry), which keeps the
//! generated discovery files in sync with the store.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/targets` | List targets (all, or filtered by `exporter` + `zone`) |
//! | POST | `/targets` | Register or replace a target |
//! | DELETE | `/targets` | Remove a target |
//! | GET | `/healthz` | Liveness probe (unauthenticated) |
//!
//! All `/targets` routes require the shared basic-auth credential pair;
//! failures answer 403, not 401, to keep browsers from prompting.

pub mod auth;
pub mod handlers;
pub mod validate;

use axum::Router;
use axum::middleware;
use axum::routing::get;

use promgrid_discovery::TargetRegistry;

pub use auth::AuthConfig;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: TargetRegistry,
}

/// Build the complete API router.
pub fn build_router(registry: TargetRegistry, auth: AuthConfig) -> Router {
    let state = ApiState { registry };

    Router::new()
        .route(
            "/targets",
            get(handlers::get_targets)
                .post(handlers::post_target)
                .delete(handlers::delete_target),
        )
        .layer(middleware::from_fn_with_state(auth, auth::require_auth))
        .with_state(state)
        .route("/healthz", get(handlers::healthz))
}
