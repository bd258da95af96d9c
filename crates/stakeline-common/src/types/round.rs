use serde::{Deserialize, Serialize};

/// Snapshot of the protocol's current reward round and its estimated end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStatus {
    pub current_round: u64,
    pub round_length: u64,
    pub start_block: u64,
    pub current_block: u64,
    pub initialized: bool,
    pub blocks_into_round: u64,
    pub blocks_remaining: u64,
    pub average_block_time: f64,
    /// Unix seconds
    pub estimated_next_round_at: i64,
    pub estimated_hours: f64,
    pub estimated_hours_rounded: u64,
    pub estimated_time_text: String,
}
