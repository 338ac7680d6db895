mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header::AUTHORIZATION, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use reverse_proxy_configurator::admin::{setup_admin_router, AppState};
use reverse_proxy_configurator::configurator::ConfiguratorOptions;
use reverse_proxy_configurator::lifecycle;

const CONFIG: &str = r#"
proxy.timeout.io: 5000
hosts:
  example.com:
    paths:
      /api:
        proxy.reverse.url: http://backend:8080
        proxy.ssl.verify-peer: OFF
"#;

fn state(api_key: Option<&str>) -> AppState {
    let (_dir, path) = common::write_config("proxy.yaml", CONFIG);
    let effective = lifecycle::load(&path, &ConfiguratorOptions::default()).unwrap();
    AppState::new(effective, api_key.map(str::to_string))
}

async fn get(state: AppState, uri: &str, key: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(key) = key {
        request = request.header(AUTHORIZATION, format!("Bearer {}", key));
    }
    let response = setup_admin_router(state)
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_rejects_missing_or_wrong_key() {
    let state = state(Some("secret"));

    let (status, _) = get(state.clone(), "/admin/status", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(state, "/admin/status", Some("guess")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_and_routes_with_key() {
    let state = state(Some("secret"));

    let (status, json) = get(state.clone(), "/admin/status", Some("secret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["generation"], 1);
    assert_eq!(json["reverse_proxies"], 1);

    let (status, json) = get(state, "/admin/routes", Some("secret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["route"]["host"], "example.com");
    assert_eq!(json[0]["route"]["path"], "/api");
    assert_eq!(json[0]["upstream"], "http://backend:8080/");
    assert_eq!(json[0]["io_timeout_ms"], 5000);
    assert_eq!(json[0]["verify_mode"], "none");
}

#[tokio::test]
async fn test_open_without_key_and_reload_visible() {
    let state = state(None);

    let (status, json) = get(state.clone(), "/admin/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["global"]["io_timeout_ms"], 5000);
    assert_eq!(json["reverse_proxies"][0]["vars"]["tls"]["verify_mode"], "none");

    state.replace(Default::default());
    let (_, json) = get(state, "/admin/status", None).await;
    assert_eq!(json["generation"], 2);
    assert_eq!(json["reverse_proxies"], 0);
}
