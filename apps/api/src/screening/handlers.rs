use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::ApiError;
use crate::rate_limit;
use crate::screening::models::ScreenRequest;
use crate::screening::screen_cv;
use crate::state::AppState;

/// POST /api/v1/screen
/// Scores a CV against role criteria. Throttled with the AI preset.
///
/// The body is extracted as a `Result` so a malformed payload still counts
/// against the quota and leaves as the standard error envelope instead of
/// axum's plain-text rejection.
pub async fn handle_screen(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ScreenRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let quota = state.rate_limiter.check(&headers, "screen", &rate_limit::AI);
    if !quota.success {
        return Ok(rate_limit::rate_limited_response(&quota));
    }

    let Json(req) = payload
        .map_err(|e| ApiError::parse("Invalid JSON body").with_details(e.body_text()))?;

    if req.cv_text.trim().is_empty() {
        return Err(ApiError::validation("cv_text is required"));
    }
    if req.role_title.trim().is_empty() {
        return Err(ApiError::validation("role_title is required"));
    }

    let analysis = screen_cv(&state.llm, &req).await?;

    let mut response = Json(analysis).into_response();
    rate_limit::add_rate_limit_headers(response.headers_mut(), &quota);
    Ok(response)
}
