use crate::{
    dto::{SignupRequest, UpdateUserRequest},
    errors::ApiError,
    models::User,
    routes::authenticate,
    states::AppState,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::info;
use validator::Validate;

/// POST /api/users
/// Body: { "email": "...", "password": "..." }
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let user = state.db.create_user(&payload.email, &payload.password).await?;

    info!("New user registered: {}", user.email);

    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users
/// Headers: Authorization: Bearer <access token>
/// Body: { "email": "...", "password": "..." }, either may be omitted
pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user_id = authenticate(&state, &headers)?;

    let payload = payload.normalized();
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let user = state
        .db
        .update_user(
            user_id,
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;

    info!("User updated: {}", user.id);

    Ok(Json(user))
}

/// GET /api/users/me
/// Headers: Authorization: Bearer <access token>
pub async fn get_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<User>, ApiError> {
    let user_id = authenticate(&state, &headers)?;

    let user = state.db.get_user(user_id).await?.ok_or(ApiError::NotFound)?;

    Ok(Json(user))
}
