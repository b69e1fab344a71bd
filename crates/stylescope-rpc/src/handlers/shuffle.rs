// crates/stylescope-rpc/src/handlers/shuffle.rs
//
// Shuffle handlers: ShuffleAndEmbed and ShuffleText.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stylescope_core::{shuffle, BlockSize, EmbedResponse, ShuffleRequest, TrajectoryPipeline};

use super::HandlerError;

// ---------------------------------------------------------------------------
// ShuffleAndEmbed
// ---------------------------------------------------------------------------

/// Handle a Shuffle request: permute the text, then embed the result.
pub async fn handle_shuffle(
    pipeline: Arc<TrajectoryPipeline>,
    request: ShuffleRequest,
) -> Result<EmbedResponse, HandlerError> {
    let response =
        tokio::task::spawn_blocking(move || pipeline.shuffle_and_embed(&request)).await??;
    Ok(response)
}

// ---------------------------------------------------------------------------
// ShuffleText
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShuffleTextRequest {
    pub text: String,
    #[serde(default, alias = "B")]
    pub block_size: Option<BlockSize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShuffleTextResponse {
    pub text: String,
}

/// Handle a ShuffleText request: return the permuted text without embedding.
pub async fn handle_shuffle_text(
    request: ShuffleTextRequest,
) -> Result<ShuffleTextResponse, HandlerError> {
    Ok(ShuffleTextResponse {
        text: shuffle(&request.text, request.block_size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shuffle_text_keeps_tokens() {
        let resp = handle_shuffle_text(ShuffleTextRequest {
            text: "a b c d e".to_string(),
            block_size: None,
        })
        .await
        .unwrap();
        let mut tokens: Vec<&str> = resp.text.split_whitespace().collect();
        tokens.sort_unstable();
        assert_eq!(tokens, vec!["a", "b", "c", "d", "e"]);
    }
}
