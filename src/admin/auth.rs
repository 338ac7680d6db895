use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::admin::state::AppState;

/// Require `Authorization: Bearer <key>` when an API key is configured.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(key) = state.api_key() else {
        return Ok(next.run(request).await);
    };

    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match auth_header.and_then(|v| v.strip_prefix("Bearer ")) {
        Some(token) if token == key => Ok(next.run(request).await),
        _ => {
            tracing::warn!(uri = %request.uri(), "Rejected admin request");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
