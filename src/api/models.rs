use serde::{Deserialize, Serialize};

use crate::data_models::ProductRankResult;

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub query: String,
    pub item_id: u64,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub query: String,
    pub item_id: u64,
    pub found: bool,
    pub result: Option<ProductRankResult>,
    pub absolute_position: Option<u64>,
    pub processing_time_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
