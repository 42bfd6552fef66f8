use crate::{
    dto::{ChirpListParams, CreateChirpRequest, SortOrder},
    errors::ApiError,
    models::Chirp,
    moderation::clean_chirp_body,
    routes::authenticate,
    states::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use std::cmp::Reverse;
use tracing::info;
use validator::Validate;

/// POST /api/chirps
/// Headers: Authorization: Bearer <access token>
/// Body: { "body": "..." }
pub async fn create_chirp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateChirpRequest>,
) -> Result<(StatusCode, Json<Chirp>), ApiError> {
    let author_id = authenticate(&state, &headers)?;

    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let body = clean_chirp_body(&payload.body);
    let chirp = state.db.create_chirp(&body, author_id).await?;

    info!("Chirp created: {} by user {}", chirp.id, author_id);

    Ok((StatusCode::CREATED, Json(chirp)))
}

/// GET /api/chirps?author_id=1&sort=desc
pub async fn get_chirps(
    State(state): State<AppState>,
    Query(params): Query<ChirpListParams>,
) -> Result<Json<Vec<Chirp>>, ApiError> {
    let mut chirps = match params.author_id() {
        Some(author_id) => state.db.list_chirps_by_author(author_id).await?,
        None => state.db.list_chirps().await?,
    };

    match params.sort_order() {
        SortOrder::Asc => chirps.sort_by_key(|chirp| chirp.id),
        SortOrder::Desc => chirps.sort_by_key(|chirp| Reverse(chirp.id)),
    }

    Ok(Json(chirps))
}

/// GET /api/chirps/{id}
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Chirp>, ApiError> {
    let chirp = state.db.get_chirp(id).await?.ok_or(ApiError::NotFound)?;

    Ok(Json(chirp))
}

/// DELETE /api/chirps/{id}
/// Headers: Authorization: Bearer <access token>
pub async fn delete_chirp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let user_id = authenticate(&state, &headers)?;

    let chirp = state.db.get_chirp(id).await?.ok_or(ApiError::NotFound)?;

    // Check ownership
    if chirp.author_id != user_id {
        return Err(ApiError::Forbidden);
    }

    if !state.db.delete_chirp(id).await? {
        return Err(ApiError::NotFound);
    }

    info!("Chirp deleted: {} by user {}", id, user_id);

    Ok(StatusCode::NO_CONTENT)
}
