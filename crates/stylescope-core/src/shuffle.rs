// crates/stylescope-core/src/shuffle.rs
//
// Deterministic token and block shuffling, used to build controlled
// perturbations of a text for before/after trajectory comparisons.

use std::num::NonZeroUsize;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::StyleScopeError;

/// Seed shared by every shuffle so the same input always permutes the same way.
pub const SHUFFLE_SEED: u64 = 0;

/// Number of consecutive tokens moved together by a block shuffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct BlockSize(NonZeroUsize);

impl BlockSize {
    pub fn new(value: i64) -> Result<Self, StyleScopeError> {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(BlockSize)
            .ok_or_else(|| {
                StyleScopeError::Validation(format!(
                    "block_size must be a positive integer, got {}",
                    value
                ))
            })
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl TryFrom<i64> for BlockSize {
    type Error = StyleScopeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        BlockSize::new(value)
    }
}

impl From<BlockSize> for i64 {
    fn from(size: BlockSize) -> i64 {
        size.get() as i64
    }
}

/// Shuffle the whitespace-delimited tokens of `text`.
///
/// Without a block size every token is permuted. With one, tokens are grouped
/// into consecutive blocks (the last may be shorter) and only the block order
/// changes. Output tokens are joined by single spaces; text with no tokens is
/// returned as given.
pub fn shuffle(text: &str, block_size: Option<BlockSize>) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return text.to_string();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(SHUFFLE_SEED);
    match block_size {
        None => {
            tokens.shuffle(&mut rng);
            tokens.join(" ")
        }
        Some(size) => {
            let mut blocks: Vec<&[&str]> = tokens.chunks(size.get()).collect();
            blocks.shuffle(&mut rng);
            blocks.concat().join(" ")
        }
    }
}
