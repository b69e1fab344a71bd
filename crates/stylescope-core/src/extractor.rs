// crates/stylescope-core/src/extractor.rs
//
// Embedder: a named layer extractor whose mode (mock or real) is fixed when
// it is constructed.
//
// Mode selection:
// - "mock" (any case) always runs in mock mode.
// - Any other name without the `candle` feature compiled in runs in mock mode
//   with a warning: the ML dependency is absent from this build.
// - Any other name with `candle` loads a real model; a missing or broken
//   model is an error and never falls back to mock.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::chunker::{chunk_ids, mock_tokenize, Chunk, ChunkSize};
use crate::embedding::MockExtractor;
use crate::error::StyleScopeError;
use crate::traits::LayerExtractor;
use crate::trajectory::LayerMatrix;

/// Model name that always selects mock mode.
pub const MOCK_MODEL: &str = "mock";

/// Construction options shared by every Embedder in a cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedderOptions {
    /// Directory searched for real model directories by id.
    pub models_dir: Option<PathBuf>,
}

/// How an Embedder produces layer matrices.
pub enum ExtractionMode {
    Mock(MockExtractor),
    #[cfg(feature = "candle")]
    Real(Box<crate::bert::BertExtractor>),
}

impl ExtractionMode {
    pub fn name(&self) -> &'static str {
        match self {
            ExtractionMode::Mock(_) => "mock",
            #[cfg(feature = "candle")]
            ExtractionMode::Real(_) => "real",
        }
    }
}

/// A model identifier bound to its extraction mode.
pub struct Embedder {
    model_id: String,
    mode: ExtractionMode,
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("model_id", &self.model_id)
            .field("mode", &self.mode.name())
            .field("shape", &self.shape())
            .finish()
    }
}

impl Embedder {
    /// A mock-mode embedder under the given name.
    pub fn mock(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            mode: ExtractionMode::Mock(MockExtractor::new()),
        }
    }

    /// Construct the embedder for `model_id`, selecting its mode once.
    pub fn load(model_id: &str, options: &EmbedderOptions) -> Result<Self, StyleScopeError> {
        let embedder = if model_id.eq_ignore_ascii_case(MOCK_MODEL) {
            Self::mock(model_id)
        } else {
            load_named(model_id, options)?
        };

        let (layers, dim) = embedder.shape();
        tracing::info!(
            model = %embedder.model_id,
            mode = embedder.mode.name(),
            layers,
            dim,
            "Embedder constructed"
        );
        Ok(embedder)
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn mode(&self) -> &ExtractionMode {
        &self.mode
    }

    pub fn is_mock(&self) -> bool {
        matches!(self.mode, ExtractionMode::Mock(_))
    }
}

#[cfg(feature = "candle")]
fn load_named(model_id: &str, options: &EmbedderOptions) -> Result<Embedder, StyleScopeError> {
    let dir = crate::bert::resolve_model_dir(model_id, options.models_dir.as_deref())?;
    let real = crate::bert::BertExtractor::load(&dir)?;
    Ok(Embedder {
        model_id: model_id.to_string(),
        mode: ExtractionMode::Real(Box::new(real)),
    })
}

#[cfg(not(feature = "candle"))]
fn load_named(model_id: &str, _options: &EmbedderOptions) -> Result<Embedder, StyleScopeError> {
    tracing::warn!(
        model = %model_id,
        "Built without real-model support; serving this model in mock mode"
    );
    Ok(Embedder::mock(model_id))
}

impl LayerExtractor for Embedder {
    fn shape(&self) -> (usize, usize) {
        match &self.mode {
            ExtractionMode::Mock(m) => m.shape(),
            #[cfg(feature = "candle")]
            ExtractionMode::Real(r) => r.shape(),
        }
    }

    fn chunk(&self, text: &str, size: ChunkSize) -> Result<Vec<Chunk>, StyleScopeError> {
        match &self.mode {
            ExtractionMode::Mock(_) => Ok(chunk_ids(&mock_tokenize(text), size)),
            #[cfg(feature = "candle")]
            ExtractionMode::Real(r) => r.chunk(text, size),
        }
    }

    fn extract(&self, chunk: &Chunk) -> Result<LayerMatrix, StyleScopeError> {
        match &self.mode {
            ExtractionMode::Mock(m) => m.extract(chunk),
            #[cfg(feature = "candle")]
            ExtractionMode::Real(r) => r.extract(chunk),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{MOCK_DIM, MOCK_LAYERS};

    #[test]
    fn test_mock_name_is_case_insensitive() {
        let e = Embedder::load("MOCK", &EmbedderOptions::default()).unwrap();
        assert!(e.is_mock());
        assert_eq!(e.model_id(), "MOCK");
        assert_eq!(e.shape(), (MOCK_LAYERS, MOCK_DIM));
    }

    #[cfg(not(feature = "candle"))]
    #[test]
    fn test_named_model_downgrades_to_mock_without_ml_support() {
        let e = Embedder::load("bert-base-uncased", &EmbedderOptions::default()).unwrap();
        assert!(e.is_mock());
        assert_eq!(e.mode().name(), "mock");
    }

    #[cfg(feature = "candle")]
    #[test]
    fn test_missing_real_model_is_fatal() {
        let options = EmbedderOptions {
            models_dir: Some(std::env::temp_dir().join("stylescope-no-such-models")),
        };
        let err = Embedder::load("definitely-not-a-model", &options).unwrap_err();
        assert!(matches!(err, StyleScopeError::ModelNotFound(_)));
    }

    #[test]
    fn test_mock_chunks_words_and_extracts_fixed_shape() {
        let e = Embedder::mock(MOCK_MODEL);
        let chunks = e.chunk("one two three four five", ChunkSize::new(2).unwrap()).unwrap();
        assert_eq!(chunks.len(), 3);
        let m = e.extract(&chunks[2]).unwrap();
        assert_eq!(m.shape(), (MOCK_LAYERS, MOCK_DIM));
    }
}
