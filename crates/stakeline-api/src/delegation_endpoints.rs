use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use stakeline_staking::delegation::{BondRequest, PreparedCall, RebondRequest, UnbondRequest};

use crate::rest::AppState;
use crate::types::{ApiError, ApiResponse};

// Each handler prepares the bonding manager call and, when a wallet id is
// present, submits it through the wallet service.

pub async fn bond(
    State(state): State<AppState>,
    payload: Result<Json<BondRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PreparedCall>>, ApiError> {
    state.metrics.increment("requests.delegation").await;
    let Json(request) = payload?;
    let call = state.delegation.prepare_bond(&request).await?;
    let prepared = state.delegation.finish(call, request.wallet_id.as_deref()).await?;
    Ok(Json(ApiResponse::success(prepared)))
}

pub async fn unbond(
    State(state): State<AppState>,
    payload: Result<Json<UnbondRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PreparedCall>>, ApiError> {
    state.metrics.increment("requests.delegation").await;
    let Json(request) = payload?;
    let call = state.delegation.prepare_unbond(&request).await?;
    let prepared = state.delegation.finish(call, request.wallet_id.as_deref()).await?;
    Ok(Json(ApiResponse::success(prepared)))
}

pub async fn rebond(
    State(state): State<AppState>,
    payload: Result<Json<RebondRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PreparedCall>>, ApiError> {
    state.metrics.increment("requests.delegation").await;
    let Json(request) = payload?;
    let call = state.delegation.prepare_rebond(&request).await?;
    let prepared = state.delegation.finish(call, request.wallet_id.as_deref()).await?;
    Ok(Json(ApiResponse::success(prepared)))
}

pub fn create_delegation_router() -> Router<AppState> {
    Router::new()
        .route("/delegation/bond", post(bond))
        .route("/delegation/unbond", post(unbond))
        .route("/delegation/rebond", post(rebond))
}
