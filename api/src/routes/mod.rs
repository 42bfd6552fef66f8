mod auth;
mod chirp;
mod health;
mod metrics;
mod user;
mod webhook;

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderMap, header},
    middleware,
    routing::{any, get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    auth::TokenKind,
    config::Config,
    errors::ApiError,
    states::AppState,
};

/// Builds the full application: API, admin pages and the static file server.
pub fn router(state: AppState, config: &Config) -> Router {
    let api = Router::new()
        .route("/healthz", get(health::health_check))
        .route("/metrics", get(metrics::hits))
        .route("/reset", any(metrics::reset))
        .route("/chirps", post(chirp::create_chirp).get(chirp::get_chirps))
        .route("/chirps/{id}", get(chirp::get_chirp).delete(chirp::delete_chirp))
        .route("/users", post(user::signup).put(user::update_user))
        .route("/users/me", get(user::get_current_user))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/revoke", post(auth::revoke))
        .route("/polka/webhooks", post(webhook::polka_webhook));

    let admin = Router::new().route("/metrics", get(metrics::admin_page));

    let fileserver = Router::new()
        .nest_service("/app", ServeDir::new(&state.fileserver_root))
        .layer(middleware::from_fn_with_state(state.clone(), metrics::count_hit));

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api)
        .nest("/admin", admin)
        .merge(fileserver)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(config.request_timeout)
                .concurrency_limit(config.max_concurrent_requests),
        )
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::InternalError(format!("Unhandled middleware error: {}", err))
    }
}

/// Pulls the raw token out of an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)
}

/// Verifies the bearer access token and returns the caller's user id.
pub(crate) fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<u64, ApiError> {
    let token = bearer_token(headers)?;
    let claims = state.tokens.verify_kind(token, TokenKind::Access)?;
    Ok(claims.user_id()?)
}
