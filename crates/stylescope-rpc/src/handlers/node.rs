// crates/stylescope-rpc/src/handlers/node.rs
//
// Node health handler.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use stylescope_core::EmbedderCache;

use super::HandlerError;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "StyleScope backend";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetHealthRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
    /// Model ids with a constructed embedder, sorted.
    pub cached_models: Vec<String>,
    pub uptime_secs: u64,
}

/// Handle a GetHealth request.
pub async fn handle_get_health(
    _request: GetHealthRequest,
    cache: &EmbedderCache,
    start_time: Instant,
) -> Result<GetHealthResponse, HandlerError> {
    Ok(GetHealthResponse {
        ok: true,
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cached_models: cache.model_ids(),
        uptime_secs: start_time.elapsed().as_secs(),
    })
}
