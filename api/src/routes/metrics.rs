use std::sync::atomic::Ordering;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, Response},
};

use crate::states::AppState;

/// Counts every request that reaches the static file server.
pub async fn count_hit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.fileserver_hits.fetch_add(1, Ordering::Relaxed);
    next.run(request).await
}

/// GET /api/metrics
pub async fn hits(State(state): State<AppState>) -> String {
    format!("Hits: {}", state.fileserver_hits.load(Ordering::Relaxed))
}

/// GET /admin/metrics
pub async fn admin_page(State(state): State<AppState>) -> Html<String> {
    let hits = state.fileserver_hits.load(Ordering::Relaxed);
    Html(format!(
        "<html>\n<body>\n<h1>Welcome, Chirpy Admin</h1>\n<p>Chirpy has been visited {} times!</p>\n</body>\n</html>\n",
        hits
    ))
}

/// /api/reset
pub async fn reset(State(state): State<AppState>) -> StatusCode {
    state.fileserver_hits.store(0, Ordering::Relaxed);
    StatusCode::OK
}
