mod common;

use axum::http::StatusCode;
use axum::{Router, routing::get};
use axum_test::TestServer;
use linkcache::api::handlers::health_handler;
use serde_json::Value;

#[tokio::test]
async fn test_health_all_ok() {
    let ctx = common::create_test_state();
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(ctx.state);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["message"], "memory connected");
}

#[tokio::test]
async fn test_health_degraded_when_cache_down() {
    let (state, _repository) = common::create_state_with_unreachable_cache();
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "error");
}
