// crates/stylescope-core/tests/pipeline_roundtrip.rs
//
// End-to-end tests for the trajectory pipeline through the public API:
// chunking, mock extraction, aggregation, projection with fallback, and
// shuffle-then-embed.

use std::sync::Arc;

use stylescope_core::aggregate::aggregate;
use stylescope_core::pipeline::extract_trajectory;
use stylescope_core::{
    shuffle, BlockSize, ChunkSize, EmbedRequest, Embedder, EmbedderCache, LayerExtractor,
    ProjectionMethod, Projector, ShuffleRequest, StyleScopeError, Trajectory2D, TrajectoryPipeline,
    TrajectoryReducer, TrajectoryMatrix, MOCK_DIM, MOCK_LAYERS,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// "w1 w2 ... wN"
fn numbered_words(n: usize) -> String {
    (1..=n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
}

fn request(text: &str, chunk_size: i64, method: ProjectionMethod) -> EmbedRequest {
    EmbedRequest {
        text: text.to_string(),
        model: "mock".to_string(),
        chunk_size: ChunkSize::new(chunk_size).unwrap(),
        method,
    }
}

fn linear_pipeline() -> TrajectoryPipeline {
    TrajectoryPipeline::new(Arc::new(EmbedderCache::default()), Projector::linear_only())
}

struct AlwaysFails;

impl TrajectoryReducer for AlwaysFails {
    fn method(&self) -> ProjectionMethod {
        ProjectionMethod::Neighborhood
    }

    fn reduce(&self, _matrix: &TrajectoryMatrix) -> Result<Trajectory2D, StyleScopeError> {
        Err(StyleScopeError::Projection("forced failure".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn test_sixty_four_words_make_two_chunks_and_a_full_trajectory() {
    let embedder = Embedder::mock("mock");
    let text = numbered_words(64);
    let size = ChunkSize::new(32).unwrap();

    let chunks = embedder.chunk(&text, size).unwrap();
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.len() == 32));

    let (trajectory, n) = extract_trajectory(&embedder, &text, size).unwrap();
    assert_eq!(n, 2);
    assert_eq!(trajectory.shape(), (MOCK_LAYERS, MOCK_DIM));

    // The trajectory is exactly the mean of the two chunk matrices.
    let a = embedder.extract(&chunks[0]).unwrap();
    let b = embedder.extract(&chunks[1]).unwrap();
    assert_eq!(aggregate(&[a, b]).unwrap(), trajectory);

    let resp = linear_pipeline()
        .embed(&request(&text, 32, ProjectionMethod::Linear))
        .unwrap();
    assert_eq!(resp.coords2d.len(), 24);
    assert_eq!((resp.layers, resp.dim, resp.chunk_size), (24, 256, 32));
    assert_eq!(resp.method, ProjectionMethod::Linear);
    assert!(resp.coords2d.iter().flatten().all(|v| v.is_finite()));
}

#[test]
fn test_identical_requests_give_identical_responses() {
    let text = "It was the best of times, it was the worst of times";
    let first = linear_pipeline()
        .embed(&request(text, 4, ProjectionMethod::Linear))
        .unwrap();
    let second = linear_pipeline()
        .embed(&request(text, 4, ProjectionMethod::Linear))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_text_still_yields_one_point_per_layer() {
    let resp = linear_pipeline()
        .embed(&request("", 32, ProjectionMethod::Linear))
        .unwrap();
    assert_eq!(resp.coords2d.len(), MOCK_LAYERS);
    assert_eq!(resp.layers, MOCK_LAYERS);
}

#[test]
fn test_different_texts_give_different_trajectories() {
    let pipeline = linear_pipeline();
    let a = pipeline.trajectory("the cat sat", "mock", ChunkSize::default()).unwrap();
    let b = pipeline.trajectory("a dog ran", "mock", ChunkSize::default()).unwrap();
    assert_ne!(a, b);
}

// ---------------------------------------------------------------------------
// Projection fallback
// ---------------------------------------------------------------------------

#[test]
fn test_neighborhood_without_reducer_reports_linear() {
    let resp = linear_pipeline()
        .embed(&request(&numbered_words(10), 5, ProjectionMethod::Neighborhood))
        .unwrap();
    assert_eq!(resp.method, ProjectionMethod::Linear);
    assert_eq!(resp.coords2d.len(), MOCK_LAYERS);
}

#[test]
fn test_failing_neighborhood_reducer_falls_back_to_linear_coords() {
    let text = numbered_words(10);
    let failing = TrajectoryPipeline::new(
        Arc::new(EmbedderCache::default()),
        Projector::with_neighborhood(Box::new(AlwaysFails)),
    );
    let fell_back = failing
        .embed(&request(&text, 5, ProjectionMethod::Neighborhood))
        .unwrap();
    let linear = linear_pipeline()
        .embed(&request(&text, 5, ProjectionMethod::Linear))
        .unwrap();
    assert_eq!(fell_back, linear);
}

#[cfg(feature = "neighborhood")]
#[test]
fn test_neighborhood_reducer_succeeds_on_mock_trajectory() {
    let pipeline = TrajectoryPipeline::default();
    let resp = pipeline
        .embed(&request(&numbered_words(40), 16, ProjectionMethod::Neighborhood))
        .unwrap();
    assert_eq!(resp.method, ProjectionMethod::Neighborhood);
    assert_eq!(resp.coords2d.len(), MOCK_LAYERS);
    assert!(resp.coords2d.iter().flatten().all(|v| v.is_finite()));
}

// ---------------------------------------------------------------------------
// Shuffle
// ---------------------------------------------------------------------------

#[test]
fn test_shuffle_then_embed_matches_manual_composition() {
    let pipeline = linear_pipeline();
    let text = numbered_words(12);
    let block = BlockSize::new(3).unwrap();

    let combined = pipeline
        .shuffle_and_embed(&ShuffleRequest {
            text: text.clone(),
            block_size: Some(block),
            model: "mock".to_string(),
            chunk_size: ChunkSize::new(4).unwrap(),
            method: ProjectionMethod::Linear,
        })
        .unwrap();
    let manual = pipeline
        .embed(&request(&shuffle(&text, Some(block)), 4, ProjectionMethod::Linear))
        .unwrap();
    assert_eq!(combined, manual);
}

#[test]
fn test_cache_is_shared_across_calls() {
    let cache = Arc::new(EmbedderCache::default());
    let pipeline = TrajectoryPipeline::new(cache.clone(), Projector::linear_only());
    pipeline.embed(&request("a b c", 2, ProjectionMethod::Linear)).unwrap();
    pipeline.embed(&request("d e f", 2, ProjectionMethod::Linear)).unwrap();
    assert_eq!(cache.model_ids(), vec!["mock".to_string()]);
}
