#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use timetrack_api::auth::jwt::JwtConfig;
use timetrack_api::auth::password::hash_password;
use timetrack_api::config::ServerConfig;
use timetrack_api::router::build_app_router;
use timetrack_api::state::AppState;
use timetrack_core::calendar::WorkingCalendar;
use timetrack_core::entry_validation::HourLimits;
use timetrack_core::roles::Role;
use timetrack_core::types::DbId;
use timetrack_db::models::user::CreateUser;
use timetrack_db::repositories::UserRepo;

pub const TEST_PASSWORD: &str = "secret123";

/// Build a test `ServerConfig` with safe defaults and 12-hour caps.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        db_path: ":memory:".to_string(),
        app_env: "test".to_string(),
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            expiry_hours: 1,
        },
        limits: HourLimits::default(),
        calendar: WorkingCalendar::default(),
        seed_demo_data: false,
    }
}

/// Build the full application router, sharing the production middleware stack.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with(pool, test_config())
}

/// Build the application router from an explicit configuration.
pub fn build_test_app_with(pool: SqlitePool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the `data` member of the envelope.
pub async fn expect_data(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["success"], true, "unexpected body: {json}");
    json["data"].clone()
}

/// Assert the status and return the error `message`.
pub async fn expect_error(response: Response<Body>, status: StatusCode) -> String {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["success"], false, "unexpected body: {json}");
    json["message"].as_str().unwrap_or_default().to_string()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user directly and return its id. Email is `{handle}@test.com`.
pub async fn create_user(pool: &SqlitePool, handle: &str, role: Role) -> DbId {
    let input = CreateUser {
        name: handle.to_string(),
        email: format!("{handle}@test.com"),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        role,
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

/// Log in through the API and return the bearer token.
pub async fn login(pool: &SqlitePool, handle: &str) -> String {
    let body = json!({ "email": format!("{handle}@test.com"), "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool.clone()), "/api/auth/login", body).await;
    let data = expect_data(response, StatusCode::OK).await;
    data["token"].as_str().unwrap().to_string()
}

/// Create a user and log them in.
pub async fn user_with_token(pool: &SqlitePool, handle: &str, role: Role) -> (DbId, String) {
    let id = create_user(pool, handle, role).await;
    let token = login(pool, handle).await;
    (id, token)
}

/// Create a client through the API and return its id.
pub async fn create_client(pool: &SqlitePool, admin_token: &str, name: &str) -> DbId {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/clients",
        json!({ "name": name }),
        admin_token,
    )
    .await;
    expect_data(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap()
}

/// Create a project through the API and return its id.
pub async fn create_project(
    pool: &SqlitePool,
    admin_token: &str,
    name: &str,
    client_id: DbId,
    leader_id: DbId,
    developer_ids: &[DbId],
) -> DbId {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/projects",
        json!({
            "name": name,
            "clientId": client_id,
            "leaderId": leader_id,
            "tasks": "Frontend,Backend,Testing",
            "developerIds": developer_ids,
        }),
        admin_token,
    )
    .await;
    expect_data(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap()
}

/// Body for a time-entry submission on `project_id`.
pub fn entry_body(project_id: DbId, date: &str, start: &str, end: &str) -> Value {
    json!({
        "projectId": project_id,
        "taskName": "Frontend",
        "date": date,
        "startTime": start,
        "endTime": end,
    })
}

/// Submit a time entry and return the raw response.
pub async fn submit_entry(
    pool: &SqlitePool,
    token: &str,
    project_id: DbId,
    date: &str,
    start: &str,
    end: &str,
) -> Response<Body> {
    post_json_auth(
        build_test_app(pool.clone()),
        "/api/time-entries",
        entry_body(project_id, date, start, end),
        token,
    )
    .await
}
