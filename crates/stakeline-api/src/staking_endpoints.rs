use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use stakeline_common::{Hint, Validator};
use stakeline_staking::{ActiveSetChange, YieldCalculation, YieldRequest};

use crate::rest::AppState;
use crate::types::{ApiError, ApiResponse};

#[derive(Debug, Deserialize)]
pub struct HintQuery {
    pub target: Option<String>,
}

/// Active validators, descending by stake
pub async fn get_validators(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Validator>>>, ApiError> {
    state.metrics.increment("requests.staking").await;
    let validators = state.delegation.validators().await?;
    Ok(Json(ApiResponse::success(validators)))
}

/// Position hint for `target` in the current ordering
pub async fn get_hint(
    State(state): State<AppState>,
    Query(query): Query<HintQuery>,
) -> Result<Json<ApiResponse<Hint>>, ApiError> {
    state.metrics.increment("requests.staking").await;
    let hint = match query.target.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(target) => state.delegation.hint(target).await?,
        None => Hint::empty(),
    };
    Ok(Json(ApiResponse::success(hint)))
}

/// Ordering after a hypothetical delegate / undelegate
pub async fn simulate(
    State(state): State<AppState>,
    payload: Result<Json<ActiveSetChange>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<Validator>>>, ApiError> {
    state.metrics.increment("requests.staking").await;
    let Json(change) = payload?;
    let ordering = state.delegation.simulate(&change).await?;
    Ok(Json(ApiResponse::success(ordering)))
}

pub async fn calculate_yield(
    State(state): State<AppState>,
    payload: Result<Json<YieldRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<YieldCalculation>>, ApiError> {
    state.metrics.increment("requests.staking").await;
    let Json(request) = payload?;
    let calculation = state.delegation.calculate_yield(&request).await?;
    Ok(Json(ApiResponse::success(calculation)))
}

pub fn create_staking_router() -> Router<AppState> {
    Router::new()
        .route("/staking/validators", get(get_validators))
        .route("/staking/hint", get(get_hint))
        .route("/staking/simulate", post(simulate))
        .route("/staking/yield", post(calculate_yield))
}
