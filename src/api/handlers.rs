use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use std::time::Instant;

use crate::error::RankError;
use crate::service::get_search_position;

use super::AppState;
use super::models::{ErrorResponse, RankRequest, RankResponse};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, code: &str, message: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            code: code.to_string(),
            message,
        }),
    )
}

impl From<RankError> for ApiError {
    fn from(err: RankError) -> Self {
        let status = match err {
            RankError::Validation(_) => StatusCode::BAD_REQUEST,
            RankError::NoProducts => StatusCode::NOT_FOUND,
            RankError::General => StatusCode::BAD_GATEWAY,
            RankError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, err.code(), err.to_string())
    }
}

pub async fn rank_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RankRequest>,
) -> Result<Json<RankResponse>, ApiError> {
    let start = Instant::now();

    let outcome = tokio::time::timeout(
        state.search_timeout,
        get_search_position(&state.client, &request.query, request.item_id),
    )
    .await
    .map_err(|_| {
        log::warn!("search for item {} timed out", request.item_id);
        error_response(
            StatusCode::GATEWAY_TIMEOUT,
            "TIMEOUT",
            format!(
                "search did not finish within {}s",
                state.search_timeout.as_secs()
            ),
        )
    })?;
    let result = outcome?;

    let page_item_count = state.client.page_item_count();
    let absolute_position = result
        .as_ref()
        .map(|r| r.absolute_position(page_item_count));

    Ok(Json(RankResponse {
        query: request.query,
        item_id: request.item_id,
        found: result.is_some(),
        result,
        absolute_position,
        processing_time_ms: start.elapsed().as_millis(),
    }))
}

pub async fn health_handler() -> &'static str {
    "ok"
}
