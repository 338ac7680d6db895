//! Read-only admin API over the effective configuration.
//!
//! # Responsibilities
//! - Report the running version and reload generation
//! - Expose the full effective configuration and a route summary as JSON
//!
//! # Design Decisions
//! - Handlers read an `ArcSwap` snapshot; reloads never block requests
//! - Bearer auth is enforced only when an API key is configured

pub mod auth;
pub mod handlers;
pub mod state;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use self::auth::admin_auth_middleware;
use self::handlers::*;
pub use self::state::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/config", get(get_config))
        .route("/admin/routes", get(get_routes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
