// crates/stylescope-core/src/pipeline.rs
//
// Entry points: text -> chunks -> per-chunk layer matrices -> mean trajectory
// -> 2D projection, optionally behind a deterministic shuffle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::cache::EmbedderCache;
use crate::chunker::ChunkSize;
use crate::error::StyleScopeError;
use crate::extractor::MOCK_MODEL;
use crate::projection::{ProjectionMethod, Projector};
use crate::shuffle::{shuffle, BlockSize};
use crate::traits::LayerExtractor;
use crate::trajectory::{LayerMatrix, Trajectory2D, TrajectoryMatrix};

fn default_model() -> String {
    MOCK_MODEL.to_string()
}

/// Input to `embed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub text: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub chunk_size: ChunkSize,
    #[serde(default)]
    pub method: ProjectionMethod,
}

/// Input to `shuffle_and_embed`: an embed request plus an optional block size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShuffleRequest {
    pub text: String,
    /// Block size; absent means every token is permuted.
    #[serde(default, alias = "B")]
    pub block_size: Option<BlockSize>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub chunk_size: ChunkSize,
    #[serde(default)]
    pub method: ProjectionMethod,
}

impl ShuffleRequest {
    /// The embed request for the shuffled text.
    pub fn shuffled(&self) -> EmbedRequest {
        EmbedRequest {
            text: shuffle(&self.text, self.block_size),
            model: self.model.clone(),
            chunk_size: self.chunk_size,
            method: self.method,
        }
    }
}

/// Output of `embed` and `shuffle_and_embed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedResponse {
    /// One `[x, y]` per layer, in layer order.
    pub coords2d: Trajectory2D,
    pub layers: usize,
    pub dim: usize,
    pub chunk_size: usize,
    /// The method actually used, after any fallback.
    pub method: ProjectionMethod,
}

/// Chunk `text`, extract every chunk in order, and average the results.
///
/// Returns the trajectory and the number of chunks it was built from.
pub fn extract_trajectory(
    extractor: &dyn LayerExtractor,
    text: &str,
    chunk_size: ChunkSize,
) -> Result<(TrajectoryMatrix, usize), StyleScopeError> {
    let chunks = extractor.chunk(text, chunk_size)?;
    let per_chunk = chunks
        .iter()
        .map(|chunk| extractor.extract(chunk))
        .collect::<Result<Vec<LayerMatrix>, _>>()?;
    let trajectory = aggregate(&per_chunk)?;
    Ok((trajectory, chunks.len()))
}

/// The trajectory-embedding pipeline over a shared Embedder cache.
#[derive(Debug)]
pub struct TrajectoryPipeline {
    cache: Arc<EmbedderCache>,
    projector: Projector,
}

impl TrajectoryPipeline {
    pub fn new(cache: Arc<EmbedderCache>, projector: Projector) -> Self {
        Self { cache, projector }
    }

    pub fn cache(&self) -> &Arc<EmbedderCache> {
        &self.cache
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// The L x D trajectory for `text` under `model`.
    pub fn trajectory(
        &self,
        text: &str,
        model: &str,
        chunk_size: ChunkSize,
    ) -> Result<TrajectoryMatrix, StyleScopeError> {
        let embedder = self.cache.get_or_create(model)?;
        let (trajectory, chunks) = extract_trajectory(embedder.as_ref(), text, chunk_size)?;
        tracing::debug!(
            model = %model,
            chunks,
            layers = trajectory.layers(),
            dim = trajectory.dim(),
            "Trajectory extracted"
        );
        Ok(trajectory)
    }

    /// Full pipeline: trajectory, then projection with fallback.
    pub fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, StyleScopeError> {
        let trajectory = self.trajectory(&request.text, &request.model, request.chunk_size)?;
        let projection = self.projector.project(&trajectory, request.method)?;
        Ok(EmbedResponse {
            coords2d: projection.coords,
            layers: trajectory.layers(),
            dim: trajectory.dim(),
            chunk_size: request.chunk_size.get(),
            method: projection.method,
        })
    }

    /// Shuffle the text, then run `embed` on the result.
    pub fn shuffle_and_embed(&self, request: &ShuffleRequest) -> Result<EmbedResponse, StyleScopeError> {
        self.embed(&request.shuffled())
    }
}

impl Default for TrajectoryPipeline {
    fn default() -> Self {
        Self::new(Arc::new(EmbedderCache::default()), Projector::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_match_service_defaults() {
        let req: EmbedRequest = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(req.model, "mock");
        assert_eq!(req.chunk_size.get(), 32);
        assert_eq!(req.method, ProjectionMethod::Linear);
    }

    #[test]
    fn test_negative_chunk_size_fails_to_parse() {
        assert!(serde_json::from_str::<EmbedRequest>(r#"{"text": "x", "chunk_size": -1}"#).is_err());
    }

    #[test]
    fn test_shuffle_request_accepts_short_block_name() {
        let req: ShuffleRequest = serde_json::from_str(r#"{"text": "a b c", "B": 2}"#).unwrap();
        assert_eq!(req.block_size.map(|b| b.get()), Some(2));
        let req: ShuffleRequest = serde_json::from_str(r#"{"text": "a b c", "B": null}"#).unwrap();
        assert!(req.block_size.is_none());
    }

    #[test]
    fn test_embed_echoes_chunk_size_and_shape() {
        let pipeline = TrajectoryPipeline::default();
        let resp = pipeline
            .embed(&EmbedRequest {
                text: "the quick brown fox jumps".to_string(),
                model: "mock".to_string(),
                chunk_size: ChunkSize::new(2).unwrap(),
                method: ProjectionMethod::Linear,
            })
            .unwrap();
        assert_eq!(resp.chunk_size, 2);
        assert_eq!(resp.layers, 24);
        assert_eq!(resp.dim, 256);
        assert_eq!(resp.coords2d.len(), resp.layers);
    }

    #[test]
    fn test_shuffle_and_embed_equals_embed_of_shuffled_text() {
        let pipeline = TrajectoryPipeline::default();
        let req = ShuffleRequest {
            text: "one two three four five six".to_string(),
            block_size: Some(BlockSize::new(2).unwrap()),
            model: "mock".to_string(),
            chunk_size: ChunkSize::new(3).unwrap(),
            method: ProjectionMethod::Linear,
        };
        let direct = pipeline.embed(&req.shuffled()).unwrap();
        assert_eq!(pipeline.shuffle_and_embed(&req).unwrap(), direct);
    }
}
