use crate::{dto::WebhookRequest, errors::ApiError, states::AppState};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;

const UPGRADE_EVENT: &str = "user.upgraded";

/// POST /api/polka/webhooks
/// Headers: Authorization: ApiKey <key> (when a key is configured)
/// Body: { "event": "user.upgraded", "data": { "user_id": 1 } }
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookRequest>,
) -> Result<Response, ApiError> {
    if let Some(expected) = &state.polka_api_key {
        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("ApiKey "))
            .map(str::trim);

        if provided != Some(expected.as_str()) {
            return Err(ApiError::Unauthorized);
        }
    }

    if payload.event != UPGRADE_EVENT {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let user = state.db.upgrade_user(payload.data.user_id).await?;

    info!("User upgraded: {}", user.id);

    Ok(Json(user).into_response())
}
