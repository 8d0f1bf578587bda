use super::{app_router, AppState};
use accountd_core::{
    FileStore, MemoryStore, PasswordPolicy, RevokedTokenStore, SessionManager, TokenService,
    UserManager, UserStore,
};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const STRONG: &str = "s3tIt0nF!re&Play1tWithYourT33th";

fn router_with<S>(store: Arc<S>) -> Router
where
    S: UserStore + RevokedTokenStore + 'static,
{
    let policy = PasswordPolicy::with_cost(4);
    let tokens = TokenService::new("test-secret", store.clone());
    let state = AppState {
        user_manager: Arc::new(UserManager::new(store.clone()).with_password_policy(policy)),
        session_manager: Arc::new(
            SessionManager::new(store, tokens.clone()).with_password_policy(policy),
        ),
        token_service: Arc::new(tokens),
    };
    app_router(state, Vec::new())
}

fn router() -> Router {
    router_with(Arc::new(MemoryStore::new()))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Create Leo and log in; returns (user id, access token).
async fn sign_up_and_login(app: &Router) -> (String, String) {
    let (status, user) = send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({ "name": "Leo Fender", "email": "leo@fender.com", "password": STRONG })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, token) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "leo@fender.com", "password": STRONG })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        user["id"].as_str().unwrap().to_string(),
        token["access_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn health_ok_without_auth() {
    let (status, body) = send(&router(), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_user_returns_summary_without_hash() {
    let app = router();
    let (status, body) = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({ "name": "Leo Fender", "email": "leo@fender.com", "password": STRONG })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Leo Fender");
    assert_eq!(body["email"], "leo@fender.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn create_user_rejection_carries_error_code() {
    let (status, body) = send(
        &router(),
        "POST",
        "/users",
        None,
        Some(json!({ "name": "Leo Fender)(*&", "email": "leo@fender.com", "password": STRONG })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "InvalidName");
}

#[tokio::test]
async fn user_routes_require_matching_token() {
    let app = router();
    let (id, token) = sign_up_and_login(&app).await;

    let (status, body) = send(&app, "GET", &format!("/users/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (status, body) = send(&app, "GET", &format!("/users/{id}"), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "MissingAuthHeader");

    let other = uuid_like();
    let (status, body) = send(&app, "GET", &format!("/users/{other}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "SubjectMismatch");
}

#[tokio::test]
async fn update_then_delete_own_account() {
    let app = router();
    let (id, token) = sign_up_and_login(&app).await;
    let uri = format!("/users/{id}");

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "name": "Clarence Leo Fender" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Clarence Leo Fender");

    let (status, _) = send(&app, "PUT", &uri, Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NotFound");
}

#[tokio::test]
async fn logout_revokes_token() {
    let app = router();
    let (id, token) = sign_up_and_login(&app).await;

    let (status, body) = send(&app, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, "GET", &format!("/users/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TokenRevoked");
}

#[tokio::test]
async fn failed_login_is_generic() {
    let app = router();
    sign_up_and_login(&app).await;
    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "leo@fender.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "LoginFailed");
}

#[tokio::test]
async fn validation_endpoints_report_instead_of_failing() {
    let app = router();
    let (status, body) = send(
        &app,
        "POST",
        "/validate/email",
        None,
        Some(json!({ "email": "x@mailforspam.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isValid"], false);
    assert_eq!(body["email"], "x@mailforspam.com");
    assert!(!body["error"].as_str().unwrap().is_empty());

    let (status, body) = send(
        &app,
        "POST",
        "/validate/password",
        None,
        Some(json!({ "password": "weak" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["strength"].as_u64().unwrap() < 2);
}

#[tokio::test]
async fn file_store_backed_router_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    store.ensure_dirs().await.unwrap();
    let app = router_with(store);

    let (id, token) = sign_up_and_login(&app).await;
    let (status, body) = send(&app, "GET", &format!("/users/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "leo@fender.com");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, body) = send(&router(), "GET", "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NotFound");
}

fn uuid_like() -> String {
    uuid::Uuid::new_v4().to_string()
}
