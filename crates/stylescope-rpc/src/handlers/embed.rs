// crates/stylescope-rpc/src/handlers/embed.rs
//
// Embed handler: text -> per-layer trajectory -> 2D coordinates.

use std::sync::Arc;

use stylescope_core::{EmbedRequest, EmbedResponse, TrajectoryPipeline};

use super::HandlerError;

/// Handle an Embed request.
///
/// Extraction and projection are CPU-bound, so they run on the blocking pool.
pub async fn handle_embed(
    pipeline: Arc<TrajectoryPipeline>,
    request: EmbedRequest,
) -> Result<EmbedResponse, HandlerError> {
    let response = tokio::task::spawn_blocking(move || pipeline.embed(&request)).await??;
    Ok(response)
}
