// crates/stylescope-core/src/lib.rs
//
// stylescope-core: per-layer text trajectories for StyleScope.
//
// Text is chunked, every chunk is mapped to one vector per model layer, the
// chunks are averaged into an L x D trajectory, and the trajectory is
// projected to 2D. A deterministic shuffler produces perturbed inputs for
// before/after comparisons, and a parenthetical-span analyzer measures how an
// author uses asides.

pub mod aggregate;
#[cfg(feature = "candle")]
pub mod bert;
pub mod cache;
pub mod chunker;
pub mod embedding;
pub mod error;
pub mod extractor;
#[cfg(feature = "neighborhood")]
pub mod neighborhood;
pub mod paren;
pub mod pipeline;
pub mod presets;
pub mod projection;
pub mod shuffle;
pub mod traits;
pub mod trajectory;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use stylescope_core::TrajectoryPipeline;`

// Data model
pub use chunker::{Chunk, ChunkSize};
pub use trajectory::{LayerMatrix, Trajectory2D, TrajectoryMatrix};

// Components
pub use aggregate::aggregate;
pub use cache::EmbedderCache;
pub use embedding::{MockExtractor, MOCK_DIM, MOCK_LAYERS};
pub use extractor::{Embedder, EmbedderOptions, ExtractionMode, MOCK_MODEL};
pub use projection::{linear_projection, Projection, ProjectionMethod, Projector};
pub use shuffle::{shuffle, BlockSize};
pub use paren::{analyze, AnalyzeReport, AnalyzeRequest};

// Pipeline entry points
pub use pipeline::{EmbedRequest, EmbedResponse, ShuffleRequest, TrajectoryPipeline};

// Error type
pub use error::{ErrorKind, StyleScopeError};

// Traits
pub use traits::{LayerExtractor, TrajectoryReducer};
