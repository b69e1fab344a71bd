// crates/stylescope-core/src/chunker.rs
//
// Splits token streams into fixed-size, non-overlapping windows.
//
// The pipeline must never see zero chunks: a text with no units yields one
// placeholder chunk holding PLACEHOLDER_TOKEN_ID.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::StyleScopeError;

/// Token id used for the placeholder chunk of an empty input.
pub const PLACEHOLDER_TOKEN_ID: i64 = 0;

/// Mock token ids live in `0..MOCK_VOCAB_SIZE`.
pub const MOCK_VOCAB_SIZE: u32 = 10_000;

/// Units per chunk when a request does not say.
pub const DEFAULT_CHUNK_SIZE: ChunkSize = match NonZeroUsize::new(32) {
    Some(n) => ChunkSize(n),
    None => panic!("default chunk size must be positive"),
};

/// Maximum number of units per chunk. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ChunkSize(NonZeroUsize);

impl ChunkSize {
    pub fn new(value: i64) -> Result<Self, StyleScopeError> {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(ChunkSize)
            .ok_or_else(|| {
                StyleScopeError::Validation(format!(
                    "chunk_size must be a positive integer, got {}",
                    value
                ))
            })
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        DEFAULT_CHUNK_SIZE
    }
}

impl TryFrom<i64> for ChunkSize {
    type Error = StyleScopeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        ChunkSize::new(value)
    }
}

impl From<ChunkSize> for i64 {
    fn from(size: ChunkSize) -> i64 {
        size.get() as i64
    }
}

/// One contiguous window of token ids, processed as a unit of extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chunk {
    ids: Vec<i64>,
}

impl Chunk {
    pub fn new(ids: Vec<i64>) -> Self {
        Self { ids }
    }

    /// The placeholder emitted for input with no units.
    pub fn placeholder() -> Self {
        Self {
            ids: vec![PLACEHOLDER_TOKEN_ID],
        }
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Raw content bytes: each id as little-endian `i64`, in order.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.ids.iter().flat_map(|id| id.to_le_bytes()).collect()
    }
}

/// Group `ids` into consecutive windows of at most `size` ids.
///
/// Falls back to a single placeholder chunk when `ids` is empty.
pub fn chunk_ids(ids: &[i64], size: ChunkSize) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = ids
        .chunks(size.get())
        .map(|window| Chunk::new(window.to_vec()))
        .collect();

    if chunks.is_empty() {
        vec![Chunk::placeholder()]
    } else {
        chunks
    }
}

/// Mock-mode token id for a single word: the first three bytes of
/// SHA-256(word) as a big-endian integer, reduced into the mock vocabulary.
pub fn mock_token_id(word: &str) -> i64 {
    let digest = Sha256::digest(word.as_bytes());
    let prefix = u32::from_be_bytes([0, digest[0], digest[1], digest[2]]);
    (prefix % MOCK_VOCAB_SIZE) as i64
}

/// Mock-mode tokenization: whitespace-delimited words, in order.
pub fn mock_tokenize(text: &str) -> Vec<i64> {
    text.split_whitespace().map(mock_token_id).collect()
}
