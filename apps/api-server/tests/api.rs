//! End-to-end tests driving the full HTTP surface in-process.
//!
//! Each test builds its own app with fresh in-memory state, so tests are
//! independent and can run in parallel.

use std::sync::Arc;

use actix_web::{App, http::header, test, web};
use serde_json::{Value, json};

use api_server::state::AppState;
use api_server::{handlers, middleware};
use taskwell_core::ports::{PasswordService, TokenService};
use taskwell_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

macro_rules! spawn_app {
    () => {{
        let state = AppState::new();
        let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_hours: 24,
            issuer: "taskwell-test".to_string(),
        }));
        let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(token_service))
                .app_data(web::Data::new(password_service))
                .app_data(
                    web::JsonConfig::default()
                        .error_handler(middleware::error::json_error_handler),
                )
                .app_data(
                    web::QueryConfig::default()
                        .error_handler(middleware::error::query_error_handler),
                )
                .app_data(
                    web::PathConfig::default()
                        .error_handler(middleware::error::path_error_handler),
                )
                .configure(handlers::configure_routes),
        )
        .await
    }};
}

/// Register a user and log in, yielding (access, refresh).
macro_rules! login_user {
    ($app:expr, $username:expr) => {{
        let creds = json!({
            "username": $username,
            "email": format!("{}@test.com", $username),
            "password": "testpass123",
        });
        let resp = test::call_service(
            &$app,
            post("/v1/auth/register", &creds).to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);

        let resp = test::call_service(
            &$app,
            post(
                "/v1/auth/login",
                &json!({"username": $username, "password": "testpass123"}),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        (
            body["data"]["access"].as_str().unwrap().to_string(),
            body["data"]["refresh"].as_str().unwrap().to_string(),
        )
    }};
}

fn post(uri: &str, body: &Value) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_json(body)
}

fn bearer(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
}

#[actix_web::test]
async fn health_check_responds_ok() {
    let app = spawn_app!();

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn register_assigns_positive_id_and_rejects_duplicates() {
    let app = spawn_app!();
    let creds = json!({
        "username": "alice",
        "email": "alice@test.com",
        "password": "testpass123",
    });

    let resp = test::call_service(&app, post("/v1/auth/register", &creds).to_request()).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["id"].as_u64().unwrap() > 0);

    // Same username again: client error, not a server error.
    let resp = test::call_service(&app, post("/v1/auth/register", &creds).to_request()).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn register_requires_all_fields() {
    let app = spawn_app!();

    let resp = test::call_service(&app, post("/v1/auth/register", &json!({})).to_request()).await;
    assert_eq!(resp.status(), 400);

    let resp = test::call_service(
        &app,
        post(
            "/v1/auth/register",
            &json!({"username": "bob", "password": "testpass123"}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn login_failures_do_not_reveal_whether_the_user_exists() {
    let app = spawn_app!();
    let _ = login_user!(app, "carol");

    let resp = test::call_service(
        &app,
        post(
            "/v1/auth/login",
            &json!({"username": "carol", "password": "wrong"}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
    let wrong_password: Value = test::read_body_json(resp).await;

    let resp = test::call_service(
        &app,
        post(
            "/v1/auth/login",
            &json!({"username": "nobody", "password": "wrong"}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
    let unknown_user: Value = test::read_body_json(resp).await;

    assert_eq!(wrong_password["error"], unknown_user["error"]);
}

#[actix_web::test]
async fn refresh_rotates_the_token_pair() {
    let app = spawn_app!();
    let (old_access, old_refresh) = login_user!(app, "dave");

    let resp = test::call_service(
        &app,
        post("/v1/auth/refresh", &json!({"refresh_token": old_refresh})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let new_access = body["data"]["access"].as_str().unwrap().to_string();
    assert_ne!(new_access, old_access);

    // The new access token works; the rotated pair does not.
    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/v1/user/profile"), &new_access).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/v1/user/profile"), &old_access).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    // Replaying the consumed refresh token fails.
    let resp = test::call_service(
        &app,
        post("/v1/auth/refresh", &json!({"refresh_token": old_refresh})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn profile_returns_the_callers_identity() {
    let app = spawn_app!();
    let (access, _) = login_user!(app, "erin");

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/v1/user/profile"), &access).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["username"], "erin");
    assert_eq!(body["data"]["email"], "erin@test.com");
}

#[actix_web::test]
async fn protected_routes_reject_missing_or_garbage_tokens() {
    let app = spawn_app!();

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/v1/user/profile").to_request())
            .await;
    assert_eq!(resp.status(), 401);

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/v1/tasks"), "not-a-token").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn task_lifecycle_create_update_archive_delete() {
    let app = spawn_app!();
    let (access, _) = login_user!(app, "frank");

    // Create
    let resp = test::call_service(
        &app,
        bearer(
            post(
                "/v1/tasks",
                &json!({"name": "Test task", "description": "e2e test"}),
            ),
            &access,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["name"], "Test task");
    assert_eq!(body["data"]["status"], "Created");
    let task_id = body["data"]["id"].as_u64().unwrap();

    // Missing name
    let resp = test::call_service(
        &app,
        bearer(post("/v1/tasks", &json!({})), &access).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);

    // Get by id
    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::get().uri(&format!("/v1/tasks/{task_id}")),
            &access,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["id"].as_u64(), Some(task_id));

    // Update with an integer status code
    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::put()
                .uri(&format!("/v1/tasks/{task_id}"))
                .set_json(json!({"name": "Updated task", "status": 1})),
            &access,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["name"], "Updated task");
    assert_eq!(body["data"]["status"], "Started");

    // Archive forces Canceled regardless of current status
    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::patch().uri(&format!("/v1/tasks/{task_id}/archive")),
            &access,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "Canceled");

    // Delete, then the id never resolves again
    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::delete().uri(&format!("/v1/tasks/{task_id}")),
            &access,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::get().uri(&format!("/v1/tasks/{task_id}")),
            &access,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn task_listing_filters_by_status_and_reports_full_total() {
    let app = spawn_app!();
    let (access, _) = login_user!(app, "grace");

    for name in ["a", "b", "c"] {
        let resp = test::call_service(
            &app,
            bearer(post("/v1/tasks", &json!({"name": name})), &access).to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);
    }

    // Start one of them
    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::put()
                .uri("/v1/tasks/1")
                .set_json(json!({"status": 1})),
            &access,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    // status filter by integer code, limit below the match count
    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::get().uri("/v1/tasks?status=0&limit=1"),
            &access,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["total"], 2);

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/v1/tasks?status=1"), &access).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["total"], 1);
}

#[actix_web::test]
async fn tasks_are_invisible_across_owners() {
    let app = spawn_app!();
    let (owner, _) = login_user!(app, "holly");
    let (intruder, _) = login_user!(app, "ivan");

    let resp = test::call_service(
        &app,
        bearer(post("/v1/tasks", &json!({"name": "secret"})), &owner).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    let task_id = body["data"]["id"].as_u64().unwrap();

    // Foreign get/update/delete are indistinguishable from nonexistence.
    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::get().uri(&format!("/v1/tasks/{task_id}")),
            &intruder,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);

    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::delete().uri(&format!("/v1/tasks/{task_id}")),
            &intruder,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/v1/tasks"), &intruder).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["total"], 0);

    // The owner still sees it.
    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::get().uri(&format!("/v1/tasks/{task_id}")),
            &owner,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn unknown_task_id_is_not_found() {
    let app = spawn_app!();
    let (access, _) = login_user!(app, "judy");

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/v1/tasks/999999"), &access).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn logout_revokes_the_session() {
    let app = spawn_app!();
    let (access, refresh) = login_user!(app, "kate");

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::post().uri("/v1/auth/logout"), &access).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    // Every subsequent use of the pair fails.
    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/v1/user/profile"), &access).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    let resp = test::call_service(
        &app,
        post("/v1/auth/refresh", &json!({"refresh_token": refresh})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
}
