use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_user, delete_user, get_user, handler_404, health, login, logout, password_strength,
    update_user, validate_email,
};
use super::state::AppState;

/// Build the CorsLayer from the configured origin list
fn build_cors_layer(cors_origins: Vec<String>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if cors_origins.is_empty() {
        tracing::warn!(
            "ACCOUNTD_CORS_ORIGINS not configured, allowing all origins. \
             Set ACCOUNTD_CORS_ORIGINS in production."
        );
        base.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .into_iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        // Credentials cannot be combined with a wildcard origin.
        base.allow_origin(origins).allow_credentials(true)
    }
}

/// Build the router with routes and middleware wired.
pub fn app_router(state: AppState, cors_origins: Vec<String>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/users", post(create_user))
        .route("/validate/email", post(validate_email))
        .route("/validate/password", post(password_strength))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout));

    // Bearer token checked per handler by the AuthorizedUser extractor
    let user_routes = Router::new().route(
        "/users/:id",
        get(get_user).put(update_user).delete(delete_user),
    );

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .fallback(handler_404)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
        .with_state(state)
}
