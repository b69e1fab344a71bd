// crates/stylescope-core/src/traits.rs

use crate::chunker::{Chunk, ChunkSize};
use crate::error::StyleScopeError;
use crate::projection::ProjectionMethod;
use crate::trajectory::{LayerMatrix, Trajectory2D, TrajectoryMatrix};

/// Turns text into chunks and chunks into per-layer matrices.
///
/// Implemented by `Embedder` for both mock and real extraction.
pub trait LayerExtractor: Send + Sync {
    /// `(layers, dim)` of every matrix this extractor returns.
    fn shape(&self) -> (usize, usize);

    /// Split text into ordered chunks of at most `size` units. Never empty.
    fn chunk(&self, text: &str, size: ChunkSize) -> Result<Vec<Chunk>, StyleScopeError>;

    /// Per-layer vectors for one chunk.
    fn extract(&self, chunk: &Chunk) -> Result<LayerMatrix, StyleScopeError>;
}

/// A strategy reducing an L x D trajectory to L x 2.
///
/// Implemented by the linear and neighborhood reducers in `projection` and
/// `neighborhood`.
pub trait TrajectoryReducer: Send + Sync {
    /// Which method this strategy implements.
    fn method(&self) -> ProjectionMethod;

    /// Reduce the trajectory. Row `i` of the output is layer `i`.
    fn reduce(&self, matrix: &TrajectoryMatrix) -> Result<Trajectory2D, StyleScopeError>;
}
