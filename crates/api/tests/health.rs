//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{
    body_json, build_test_app, build_test_app_with, get, get_auth, test_config, user_with_token,
};
use sqlx::SqlitePool;
use timetrack_api::config::ServerConfig;
use timetrack_core::roles::Role;
use tower::ServiceExt;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_health_check_reports_database(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "ok");
    assert!(json["data"]["version"].is_string());
    assert_eq!(json["data"]["dbHealthy"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_route_returns_404_envelope(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Route not found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_response_carries_request_id(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header")
        .to_str()
        .unwrap();
    assert_eq!(request_id.len(), 36, "x-request-id should be a UUID string");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cors_preflight_allows_configured_origin(pool: SqlitePool) {
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/time-entries")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type,authorization")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .expect("Missing Access-Control-Allow-Origin header")
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "http://localhost:5173");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_non_numeric_id_is_400_envelope(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;

    let response = get_auth(build_test_app(pool.clone()), "/api/users/abc", &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("abc"), "{json}");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_malformed_query_is_400_envelope(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/reports/summary?clientId=acme",
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());
}

// ---------------------------------------------------------------------------
// Internal error detail
// ---------------------------------------------------------------------------

/// Log in an admin, then break the entries table so listing fails with a 500.
async fn broken_store(pool: &SqlitePool) -> String {
    let (_, admin) = user_with_token(pool, "admin", Role::Admin).await;
    sqlx::query("DROP TABLE time_entries")
        .execute(pool)
        .await
        .unwrap();
    admin
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_internal_error_detail_exposed_outside_production(pool: SqlitePool) {
    let admin = broken_store(&pool).await;

    let response = get_auth(build_test_app(pool.clone()), "/api/time-entries", &admin).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Internal server error");
    assert!(json["error"].as_str().unwrap().contains("time_entries"), "{json}");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_internal_error_detail_hidden_in_production(pool: SqlitePool) {
    let admin = broken_store(&pool).await;
    let production = ServerConfig {
        app_env: "production".to_string(),
        ..test_config()
    };
    // A development router built in the same process must not leak into it.
    let _development = build_test_app(pool.clone());
    let app = build_test_app_with(pool.clone(), production);

    let response = get_auth(app, "/api/time-entries", &admin).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Internal server error");
    assert!(json.get("error").is_none(), "{json}");
}
