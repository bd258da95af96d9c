use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use stakeline_common::RoundStatus;
use stakeline_staking::{sample_average_block_time, BlockTimeSample};

use crate::rest::AppState;
use crate::types::{ApiError, ApiResponse};

pub const DEFAULT_BLOCK_SAMPLES: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct BlockTimeQuery {
    pub samples: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTimeReport {
    #[serde(flatten)]
    pub sample: BlockTimeSample,
    /// Value the round estimate actually uses
    pub configured_block_time: f64,
}

/// Current round and estimated time until the next one
pub async fn get_round_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RoundStatus>>, ApiError> {
    state.metrics.increment("requests.protocol").await;
    let status = state.rounds.status().await?;

    state
        .metrics
        .set_metric("round.current", serde_json::json!(status.current_round))
        .await;
    state
        .metrics
        .set_metric("round.blocks_remaining", serde_json::json!(status.blocks_remaining))
        .await;

    Ok(Json(ApiResponse::success(status)))
}

pub async fn get_block_time(
    State(state): State<AppState>,
    query: Result<Query<BlockTimeQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<BlockTimeReport>>, ApiError> {
    state.metrics.increment("requests.protocol").await;
    let Query(query) = query?;
    let provider = state
        .rounds
        .block_provider()
        .ok_or_else(|| ApiError::Unavailable("settlement chain RPC is not configured".into()))?;

    let samples = query.samples.unwrap_or(DEFAULT_BLOCK_SAMPLES).max(1);
    let sample = sample_average_block_time(provider.as_ref(), samples).await?;

    Ok(Json(ApiResponse::success(BlockTimeReport {
        sample,
        configured_block_time: state.rounds.average_block_time(),
    })))
}

pub fn create_protocol_router() -> Router<AppState> {
    Router::new()
        .route("/protocol/status", get(get_round_status))
        .route("/protocol/block-time", get(get_block_time))
}
