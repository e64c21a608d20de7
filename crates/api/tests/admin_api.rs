//! Users, clients, projects and templates: RBAC, CRUD round-trips and
//! cascading deletes.

mod common;

use axum::http::StatusCode;
use common::{
    build_test_app, create_client, create_project, delete_auth, expect_data, expect_error,
    get_auth, post_json_auth, put_json_auth, submit_entry, user_with_token,
};
use serde_json::json;
use sqlx::SqlitePool;
use timetrack_core::roles::Role;
use timetrack_db::repositories::{ProjectRepo, TimeEntryRepo};

// ---------------------------------------------------------------------------
// RBAC
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unauthenticated_requests_are_401(pool: SqlitePool) {
    for uri in ["/api/users", "/api/clients", "/api/projects", "/api/templates"] {
        let response = common::get(build_test_app(pool.clone()), uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_non_admin_cannot_create_master_data(pool: SqlitePool) {
    let (_, dev) = user_with_token(&pool, "dev", Role::Developer).await;
    let (_, leader) = user_with_token(&pool, "lead", Role::Leader).await;

    for token in [&dev, &leader] {
        let response = post_json_auth(
            build_test_app(pool.clone()),
            "/api/clients",
            json!({ "name": "Acme" }),
            token,
        )
        .await;
        let message = expect_error(response, StatusCode::FORBIDDEN).await;
        assert!(!message.is_empty());
    }

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/users",
        json!({ "name": "X", "email": "x@test.com", "password": "secret1", "role": "admin" }),
        &dev,
    )
    .await;
    expect_error(response, StatusCode::FORBIDDEN).await;
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_creates_user_and_duplicate_email_is_400(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    let body = json!({
        "name": "Carlos Lopez",
        "email": "carlos@test.com",
        "password": "dev123",
        "role": "developer",
    });

    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/users", body.clone(), &admin).await;
    let data = expect_data(response, StatusCode::CREATED).await;
    assert_eq!(data["email"], "carlos@test.com");
    assert_eq!(data["role"], "developer");
    assert!(data.get("passwordHash").is_none());

    let response = post_json_auth(build_test_app(pool.clone()), "/api/users", body, &admin).await;
    let message = expect_error(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "Email is already registered");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_user_validates_input(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;

    let cases = [
        json!({ "name": "A", "email": "not-an-email", "password": "secret1", "role": "developer" }),
        json!({ "name": "A", "email": "a@test.com", "password": "123", "role": "developer" }),
        json!({ "name": "A", "email": "a@test.com", "password": "secret1", "role": "manager" }),
        json!({ "name": "  ", "email": "a@test.com", "password": "secret1", "role": "developer" }),
    ];
    for body in cases {
        let response =
            post_json_auth(build_test_app(pool.clone()), "/api/users", body.clone(), &admin).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_user_can_edit_self_but_not_role(pool: SqlitePool) {
    let (id, dev) = user_with_token(&pool, "dev", Role::Developer).await;
    let (other, _) = user_with_token(&pool, "other", Role::Developer).await;
    let uri = format!("/api/users/{id}");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "name": "Renamed" }),
        &dev,
    )
    .await;
    let data = expect_data(response, StatusCode::OK).await;
    assert_eq!(data["name"], "Renamed");
    assert_eq!(data["email"], "dev@test.com");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "role": "admin" }),
        &dev,
    )
    .await;
    let message = expect_error(response, StatusCode::FORBIDDEN).await;
    assert_eq!(message, "Only admins can change roles");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/users/{other}"),
        json!({ "name": "Hijacked" }),
        &dev,
    )
    .await;
    expect_error(response, StatusCode::FORBIDDEN).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_changes_role(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    let (id, _) = user_with_token(&pool, "dev", Role::Developer).await;

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/users/{id}"),
        json!({ "role": "leader" }),
        &admin,
    )
    .await;
    let data = expect_data(response, StatusCode::OK).await;
    assert_eq!(data["role"], "leader");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_cannot_delete_self(pool: SqlitePool) {
    let (id, admin) = user_with_token(&pool, "admin", Role::Admin).await;

    let response =
        delete_auth(build_test_app(pool.clone()), &format!("/api/users/{id}"), &admin).await;
    expect_error(response, StatusCode::BAD_REQUEST).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_user_is_404(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;

    let response = get_auth(build_test_app(pool.clone()), "/api/users/9999", &admin).await;
    expect_error(response, StatusCode::NOT_FOUND).await;

    let response = delete_auth(build_test_app(pool.clone()), "/api/users/9999", &admin).await;
    expect_error(response, StatusCode::NOT_FOUND).await;
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_client_round_trip(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    let (_, dev) = user_with_token(&pool, "dev", Role::Developer).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/clients",
        json!({ "name": "  Acme  ", "description": "Widgets" }),
        &admin,
    )
    .await;
    let created = expect_data(response, StatusCode::CREATED).await;
    assert_eq!(created["name"], "Acme");
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/clients/{id}");

    // Any authenticated user can read.
    let response = get_auth(build_test_app(pool.clone()), &uri, &dev).await;
    let fetched = expect_data(response, StatusCode::OK).await;
    assert_eq!(fetched["description"], "Widgets");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "name": "Acme Corp" }),
        &admin,
    )
    .await;
    let updated = expect_data(response, StatusCode::OK).await;
    assert_eq!(updated["name"], "Acme Corp");
    assert_eq!(updated["description"], "Widgets");

    let response = delete_auth(build_test_app(pool.clone()), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(build_test_app(pool.clone()), &uri, &admin).await;
    expect_error(response, StatusCode::NOT_FOUND).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_client_requires_name(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/clients",
        json!({ "name": "" }),
        &admin,
    )
    .await;
    let message = expect_error(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "name is required");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_deleting_client_cascades_to_projects_and_entries(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    let (leader_id, _) = user_with_token(&pool, "lead", Role::Leader).await;
    let (_, dev) = user_with_token(&pool, "dev", Role::Developer).await;

    let client_id = create_client(&pool, &admin, "Acme").await;
    let project_id = create_project(&pool, &admin, "Website", client_id, leader_id, &[]).await;
    let response = submit_entry(&pool, &dev, project_id, "2024-01-10", "09:00", "13:00").await;
    let entry_id = expect_data(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap();

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/clients/{client_id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(ProjectRepo::find_by_id(&pool, project_id).await.unwrap().is_none());
    assert!(TimeEntryRepo::find_by_id(&pool, entry_id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_project_create_joins_names_and_developers(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    let (leader_id, _) = user_with_token(&pool, "lead", Role::Leader).await;
    let (dev_id, dev) = user_with_token(&pool, "dev", Role::Developer).await;
    let client_id = create_client(&pool, &admin, "Acme").await;

    let project_id =
        create_project(&pool, &admin, "Website", client_id, leader_id, &[dev_id]).await;

    let response = get_auth(
        build_test_app(pool.clone()),
        &format!("/api/projects/{project_id}"),
        &dev,
    )
    .await;
    let project = expect_data(response, StatusCode::OK).await;
    assert_eq!(project["name"], "Website");
    assert_eq!(project["clientName"], "Acme");
    assert_eq!(project["leaderName"], "lead");
    assert_eq!(project["tasks"], "Frontend,Backend,Testing");
    assert_eq!(project["developerIds"], json!([dev_id]));

    let response = get_auth(
        build_test_app(pool.clone()),
        &format!("/api/projects/leader/{leader_id}"),
        &dev,
    )
    .await;
    let led = expect_data(response, StatusCode::OK).await;
    assert_eq!(led.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_project_rejects_bad_references(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    let (leader_id, _) = user_with_token(&pool, "lead", Role::Leader).await;
    let (dev_id, _) = user_with_token(&pool, "dev", Role::Developer).await;
    let client_id = create_client(&pool, &admin, "Acme").await;

    let cases = [
        json!({ "name": "P", "clientId": 9999, "leaderId": leader_id }),
        json!({ "name": "P", "clientId": client_id, "leaderId": 9999 }),
        json!({ "name": "P", "clientId": client_id, "leaderId": dev_id }),
        json!({ "name": "P", "clientId": client_id, "leaderId": leader_id, "developerIds": [9999] }),
        json!({ "name": "P", "leaderId": leader_id }),
    ];
    for body in cases {
        let response =
            post_json_auth(build_test_app(pool.clone()), "/api/projects", body.clone(), &admin)
                .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_project_from_template_copies_tasks(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    let (leader_id, _) = user_with_token(&pool, "lead", Role::Leader).await;
    let client_id = create_client(&pool, &admin, "Acme").await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/templates",
        json!({ "name": "Web", "tasks": "Frontend, Backend ,Testing" }),
        &admin,
    )
    .await;
    let template = expect_data(response, StatusCode::CREATED).await;
    assert_eq!(template["tasks"], "Frontend,Backend,Testing");

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/projects",
        json!({
            "name": "Portal",
            "clientId": client_id,
            "leaderId": leader_id,
            "templateId": template["id"],
            "tasks": "Backend,Deployment",
        }),
        &admin,
    )
    .await;
    let project = expect_data(response, StatusCode::CREATED).await;
    assert_eq!(project["tasks"], "Frontend,Backend,Testing,Deployment");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_developer_assignment_can_be_replaced(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    let (leader_id, _) = user_with_token(&pool, "lead", Role::Leader).await;
    let (a, _) = user_with_token(&pool, "a", Role::Developer).await;
    let (b, _) = user_with_token(&pool, "b", Role::Developer).await;
    let client_id = create_client(&pool, &admin, "Acme").await;
    let project_id = create_project(&pool, &admin, "Website", client_id, leader_id, &[a]).await;
    let uri = format!("/api/projects/{project_id}/developers");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "developerIds": [b, a, b] }),
        &admin,
    )
    .await;
    let mut assigned: Vec<i64> = serde_json::from_value(expect_data(response, StatusCode::OK).await)
        .unwrap();
    assigned.sort_unstable();
    let mut expected = vec![a, b];
    expected.sort_unstable();
    assert_eq!(assigned, expected);

    let response = get_auth(build_test_app(pool.clone()), &uri, &admin).await;
    let listed = expect_data(response, StatusCode::OK).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/projects/9999/developers",
        &admin,
    )
    .await;
    expect_error(response, StatusCode::NOT_FOUND).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_project_update_and_delete(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;
    let (leader_id, _) = user_with_token(&pool, "lead", Role::Leader).await;
    let client_id = create_client(&pool, &admin, "Acme").await;
    let project_id = create_project(&pool, &admin, "Website", client_id, leader_id, &[]).await;
    let uri = format!("/api/projects/{project_id}");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "name": "Website v2", "tasks": "Design,,Design,QA" }),
        &admin,
    )
    .await;
    let project = expect_data(response, StatusCode::OK).await;
    assert_eq!(project["name"], "Website v2");
    assert_eq!(project["tasks"], "Design,QA");
    assert_eq!(project["clientId"], client_id);

    let response = delete_auth(build_test_app(pool.clone()), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = delete_auth(build_test_app(pool.clone()), &uri, &admin).await;
    expect_error(response, StatusCode::NOT_FOUND).await;
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_template_requires_at_least_one_task(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/templates",
        json!({ "name": "Empty", "tasks": " , ," }),
        &admin,
    )
    .await;
    let message = expect_error(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "tasks must contain at least one task");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_template_round_trip(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "admin", Role::Admin).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/templates",
        json!({ "name": "Mobile", "description": "Apps", "tasks": "UI/UX,Testing" }),
        &admin,
    )
    .await;
    let id = expect_data(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/templates/{id}");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "tasks": "UI/UX,Testing,Release" }),
        &admin,
    )
    .await;
    let updated = expect_data(response, StatusCode::OK).await;
    assert_eq!(updated["tasks"], "UI/UX,Testing,Release");
    assert_eq!(updated["name"], "Mobile");

    let response = get_auth(build_test_app(pool.clone()), "/api/templates", &admin).await;
    let list = expect_data(response, StatusCode::OK).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = delete_auth(build_test_app(pool.clone()), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_auth(build_test_app(pool.clone()), &uri, &admin).await;
    expect_error(response, StatusCode::NOT_FOUND).await;
}
