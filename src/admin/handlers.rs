use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::state::AppState;
use crate::configurator::{EffectiveConfig, RouteKey};
use crate::tls::VerifyMode;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub generation: u64,
    pub reverse_proxies: usize,
}

/// One line per registration, flattened for operators.
#[derive(Serialize)]
pub struct RouteSummary {
    pub route: RouteKey,
    pub upstream: String,
    pub io_timeout_ms: u128,
    pub websocket: bool,
    pub verify_mode: VerifyMode,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        generation: state.generation(),
        reverse_proxies: state.current().reverse_proxies.len(),
    })
}

pub async fn get_config(State(state): State<AppState>) -> Json<EffectiveConfig> {
    Json(EffectiveConfig::clone(&state.current()))
}

pub async fn get_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    let current = state.current();
    let routes = current
        .reverse_proxies
        .iter()
        .map(|r| RouteSummary {
            route: r.route.clone(),
            upstream: r.target.url.to_string(),
            io_timeout_ms: r.vars.io_timeout.as_millis(),
            websocket: r.vars.websocket.enabled,
            verify_mode: r.vars.tls.verify_mode(),
        })
        .collect();
    Json(routes)
}
