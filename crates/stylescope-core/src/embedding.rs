// crates/stylescope-core/src/embedding.rs
//
// Deterministic mock layer vectors. No ML model required.
//
// A chunk's raw id bytes are hashed with SHA-256, the digest seeds a ChaCha8
// stream, and a layers x dim matrix of standard-normal values is drawn from it
// with an explicit Box-Muller transform. The transcendental functions come
// from libm rather than the platform math library, so identical chunk content
// gives a bit-identical matrix on every platform.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::chunker::Chunk;
use crate::error::StyleScopeError;
use crate::trajectory::LayerMatrix;

/// Layer count of mock-mode matrices.
pub const MOCK_LAYERS: usize = 24;

/// Vector dimension of mock-mode matrices.
pub const MOCK_DIM: usize = 256;

/// SHA-256 of the chunk's ids as consecutive little-endian `i64` bytes.
pub fn content_seed(chunk: &Chunk) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(chunk.to_le_bytes());
    let digest = hasher.finalize();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    seed
}

/// Standard-normal sampler over a seeded ChaCha8 stream.
///
/// Each pair of outputs consumes two `u64` draws `x1, x2`, mapped to
/// `u = 1 - (x >> 11) * 2^-53` in (0, 1], then
/// `z0 = sqrt(-2 ln u1) cos(2 pi u2)` and `z1 = sqrt(-2 ln u1) sin(2 pi u2)`.
#[derive(Debug, Clone)]
pub struct StandardNormal {
    rng: ChaCha8Rng,
    spare: Option<f64>,
}

impl StandardNormal {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: ChaCha8Rng::from_seed(seed),
            spare: None,
        }
    }

    fn unit_open_closed(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (1u64 << 53) as f64;
        1.0 - (self.rng.next_u64() >> 11) as f64 * SCALE
    }

    pub fn sample(&mut self) -> f64 {
        if let Some(z1) = self.spare.take() {
            return z1;
        }
        let u1 = self.unit_open_closed();
        let u2 = self.unit_open_closed();
        let (z0, z1) = box_muller(u1, u2);
        self.spare = Some(z1);
        z0
    }
}

/// Map two uniforms in (0, 1] to two independent standard normals.
pub fn box_muller(u1: f64, u2: f64) -> (f64, f64) {
    let r = libm::sqrt(-2.0 * libm::log(u1));
    let (sin, cos) = libm::sincos(2.0 * std::f64::consts::PI * u2);
    (r * cos, r * sin)
}

/// Draw the mock layer matrix for one chunk.
pub fn hash_layer_matrix(chunk: &Chunk, layers: usize, dim: usize) -> Vec<f32> {
    let mut normal = StandardNormal::from_seed(content_seed(chunk));
    (0..layers * dim).map(|_| normal.sample() as f32).collect()
}

/// Stateless extractor for mock mode. Shape is fixed at 24 x 256.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor;

impl MockExtractor {
    pub fn new() -> Self {
        MockExtractor
    }

    pub fn shape(&self) -> (usize, usize) {
        (MOCK_LAYERS, MOCK_DIM)
    }

    pub fn extract(&self, chunk: &Chunk) -> Result<LayerMatrix, StyleScopeError> {
        LayerMatrix::from_flat(
            MOCK_LAYERS,
            MOCK_DIM,
            hash_layer_matrix(chunk, MOCK_LAYERS, MOCK_DIM),
        )
    }
}
