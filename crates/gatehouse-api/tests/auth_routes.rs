//! Drives the `/auth/*` routes through the full middleware stack.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use gatehouse_api::{AppState, build_app};
use gatehouse_auth::jwt::TokenCodec;
use gatehouse_auth::password::{PasswordHasher, PasswordValidator};
use gatehouse_auth::session::{DecisionCache, SessionAuthority};
use gatehouse_cache::memory::MemoryCacheProvider;
use gatehouse_cache::provider::CacheManager;
use gatehouse_core::config::AppConfig;
use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::config::cache::MemoryCacheConfig;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::TaskDispatcher;
use gatehouse_core::types::AsyncTask;
use gatehouse_database::{CredentialStore, MemoryUserStore};
use gatehouse_service::{AccountService, SideEffects};

const SESSION_HEADER: &str = "x-session-user-id";

#[derive(Debug)]
struct Discard;

#[async_trait]
impl TaskDispatcher for Discard {
    async fn submit(&self, _task: AsyncTask) -> AppResult<()> {
        Ok(())
    }
}

struct TestApp {
    router: Router,
    store: Arc<MemoryUserStore>,
}

fn app_with_secret(secret: &str) -> TestApp {
    let config = AppConfig {
        auth: AuthConfig {
            jwt_secret: secret.into(),
            privileged_email_domains: vec!["corp.example".into()],
            ..AuthConfig::default()
        },
        ..AppConfig::default()
    };

    let store = Arc::new(MemoryUserStore::new());
    let codec = Arc::new(TokenCodec::new(&config.auth));
    let provider = MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 });
    let cache = DecisionCache::new(
        Arc::new(CacheManager::from_provider(Arc::new(provider))),
        Duration::from_secs(3600),
    );
    let authority = Arc::new(SessionAuthority::new(
        codec.clone(),
        store.clone(),
        cache,
        &config.auth,
    ));
    let accounts = Arc::new(AccountService::new(
        store.clone(),
        codec,
        authority.clone(),
        Arc::new(PasswordHasher::new()),
        Arc::new(PasswordValidator::new(&config.auth)),
        SideEffects::new(Arc::new(Discard)),
    ));

    let state = AppState::new(Arc::new(config), authority, accounts);
    TestApp {
        router: build_app(state),
        store,
    }
}

fn app() -> TestApp {
    app_with_secret("api-test-secret")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_as(uri: &str, user_id: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(SESSION_HEADER, user_id)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn check_with_header(token: &str) -> Request<Body> {
    Request::get("/auth/check")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn register(router: &Router, email: &str, password: &str) -> (String, String) {
    let (status, body) = send(
        router,
        post_json(
            "/auth/register",
            json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    (
        body["token"].as_str().unwrap().to_string(),
        body["id"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn register_then_check_returns_user_decision() {
    let app = app();
    let (token, id) = register(&app.router, "bob@example.com", "hunter22").await;

    let (status, body) = send(&app.router, check_with_header(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "role": "user", "userId": id, "allowedRoles": ["user"] })
    );
}

#[tokio::test]
async fn check_without_token_is_public() {
    let app = app();
    let request = Request::get("/auth/check").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "role": "public" }));

    let request = Request::post("/auth/check").body(Body::empty()).unwrap();
    let (_, body) = send(&app.router, request).await;
    assert_eq!(body, json!({ "role": "public" }));
}

#[tokio::test]
async fn check_reads_token_from_query_and_body() {
    let app = app();
    let (token, _) = register(&app.router, "alice@corp.example", "hunter22").await;

    let request = Request::get(format!("/auth/check?token={token}"))
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app.router, request).await;
    assert_eq!(body["role"], "superuser");
    assert_eq!(body["allowedRoles"], json!(["user", "superuser"]));

    let (_, body) = send(
        &app.router,
        post_json("/auth/check", json!({ "token": format!("Bearer {token}") })),
    )
    .await;
    assert_eq!(body["role"], "superuser");
}

#[tokio::test]
async fn check_header_wins_over_unparseable_body() {
    let app = app();
    let (token, id) = register(&app.router, "bob@example.com", "hunter22").await;

    let request = Request::post("/auth/check")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], id);

    let request = Request::post("/auth/check")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn check_with_bad_token_is_unauthorized() {
    let app = app();
    let (status, body) = send(&app.router, check_with_header("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn login_round_trip_and_failures() {
    let app = app();
    register(&app.router, "A@X.com", "abcde").await;

    let (status, body) = send(
        &app.router,
        post_json("/auth/login", json!({ "email": "a@x.com", "password": "abcde" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, body) = send(
        &app.router,
        post_json("/auth/login", json!({ "email": "a@x.com", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Email or password did not match.");

    let (status, _) = send(
        &app.router,
        post_json("/auth/login", json!({ "email": "z@x.com", "password": "abcde" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_and_weak_registrations_are_bad_requests() {
    let app = app();
    register(&app.router, "bob@example.com", "hunter22").await;

    let (status, body) = send(
        &app.router,
        post_json(
            "/auth/register",
            json!({ "email": "bob@example.com", "password": "hunter22" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User with email bob@example.com already exists.");

    let (status, _) = send(
        &app.router,
        post_json(
            "/auth/register",
            json!({ "email": "new@example.com", "password": "abc" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_bad_request_with_message() {
    let app = app();
    let request = Request::post("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn missing_secret_is_internal_error() {
    let app = app_with_secret("");
    let (status, body) = send(
        &app.router,
        post_json(
            "/auth/register",
            json!({ "email": "bob@example.com", "password": "hunter22" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn session_routes_require_session_header() {
    let app = app();
    let (status, _) = send(
        &app.router,
        post_json(
            "/auth/change-password",
            json!({ "oldPassword": "a", "newPassword": "bbbbbb" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app.router,
        post_as("/auth/resend-verification", "not-a-uuid", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_revokes_previous_token() {
    let app = app();
    let (t1, id) = register(&app.router, "bob@example.com", "hunter22").await;
    let (status, _) = send(&app.router, check_with_header(&t1)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app.router,
        post_as(
            "/auth/change-password",
            &id,
            json!({ "oldPassword": "hunter22", "newPassword": "hunter33" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (status, _) = send(&app.router, check_with_header(&t1)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        post_json(
            "/auth/login",
            json!({ "email": "bob@example.com", "password": "hunter33" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let t2 = body["token"].as_str().unwrap();
    let (_, body) = send(&app.router, check_with_header(t2)).await;
    assert_eq!(body["userId"], id);
}

#[tokio::test]
async fn verification_and_reset_over_http() {
    let app = app();
    let (_, id) = register(&app.router, "bob@example.com", "hunter22").await;
    let user_id = id.parse().unwrap();

    app.store.set_verification_code(user_id, "VerifyMe").await.unwrap();
    let (status, body) = send(
        &app.router,
        post_json("/auth/verify-email", json!({ "code": "VerifyMe" })),
    )
    .await;
    assert_eq!((status, body), (StatusCode::OK, json!(true)));
    let (status, _) = send(
        &app.router,
        post_json("/auth/verify-email", json!({ "code": "VerifyMe" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        post_json("/auth/request-password-reset", json!({ "email": "bob@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    app.store.set_password_reset_code(user_id, "ResetMe1").await.unwrap();
    let (status, _) = send(
        &app.router,
        post_json(
            "/auth/reset-password",
            json!({ "email": "bob@example.com", "code": "ResetMe1", "newPassword": "fresh-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app.router,
        post_json(
            "/auth/login",
            json!({ "email": "bob@example.com", "password": "fresh-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn change_email_and_destroy_account() {
    let app = app();
    let (token, id) = register(&app.router, "bob@example.com", "hunter22").await;

    let (status, _) = send(
        &app.router,
        post_as(
            "/auth/change-email",
            &id,
            json!({ "password": "hunter22", "newEmail": "bob@corp.example" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Flushed on change, so the same token now derives the new role.
    let (_, body) = send(&app.router, check_with_header(&token)).await;
    assert_eq!(body["role"], "superuser");

    let (status, _) = send(
        &app.router,
        post_as("/auth/destroy-account", &id, json!({ "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.store.is_empty().await);

    let (status, _) = send(&app.router, check_with_header(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
