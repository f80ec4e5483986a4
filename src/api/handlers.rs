//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use super::AppState;
use super::types::{ErrorResponse, StrategyInfo};
use crate::service::{DispatchRequest, DispatchResponse};
use crate::solver::StrategyKind;

/// Solves one dispatch request.
///
/// `POST /dispatch` → 200 + `DispatchResponse` JSON
/// malformed body, invalid input, or unknown strategy → 400 + `ErrorResponse`
///
/// Missing fields report `invalid_input`, the same kind as bad values.
pub async fn post_dispatch(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<DispatchResponse>, (StatusCode, Json<ErrorResponse>)> {
    DispatchRequest::from_json(&body)
        .and_then(|request| state.service.dispatch(&request))
        .map(Json)
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(&e))))
}

/// Lists registered strategies.
///
/// `GET /strategies` → 200 + `Vec<StrategyInfo>` JSON
pub async fn get_strategies() -> Json<Vec<StrategyInfo>> {
    Json(StrategyKind::ALL.into_iter().map(StrategyInfo::from).collect())
}
