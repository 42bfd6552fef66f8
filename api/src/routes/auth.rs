use crate::{
    auth::TokenKind,
    db::DbError,
    dto::{LoginRequest, LoginResponse, RefreshResponse},
    errors::ApiError,
    routes::bearer_token,
    states::AppState,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::{info, warn};

/// POST /api/login
/// Body: { "email": "...", "password": "..." }
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if state.login_limiter.check().is_err() {
        warn!("Login rate limit exceeded");
        return Err(ApiError::TooManyRequests);
    }

    // Unknown email and wrong password look the same to the client.
    let user = match state
        .db
        .validate_credentials(&payload.email, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(e @ (DbError::UserNotFound | DbError::InvalidPassword)) => {
            info!("Failed login for {}: {}", payload.email, e);
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.tokens.issue(TokenKind::Access, user.id)?;
    let refresh_token = state.tokens.issue(TokenKind::Refresh, user.id)?;

    info!("User logged in: {}", user.email);

    Ok(Json(LoginResponse {
        user,
        token,
        refresh_token,
    }))
}

/// POST /api/refresh
/// Headers: Authorization: Bearer <refresh token>
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let refresh_token = bearer_token(&headers)?;

    let token = state.tokens.refresh(refresh_token).await?;

    Ok(Json(RefreshResponse { token }))
}

/// POST /api/revoke
/// Headers: Authorization: Bearer <refresh token>
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let refresh_token = bearer_token(&headers)?;

    state.tokens.revoke(refresh_token).await?;

    info!("Refresh token revoked");

    Ok(StatusCode::NO_CONTENT)
}
