// crates/stylescope-core/src/cache.rs
//
// Process-wide Embedder registry.
//
// Each model id maps to its own OnceCell, which doubles as that id's
// construction lock: concurrent first requests for one id build it once,
// while loads of different ids proceed in parallel. Entries are never evicted.
// A failed construction leaves the cell empty so a later request retries.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;

use crate::error::StyleScopeError;
use crate::extractor::{Embedder, EmbedderOptions};

/// Builds an Embedder for a model id.
pub type EmbedderLoader = Arc<dyn Fn(&str) -> Result<Embedder, StyleScopeError> + Send + Sync>;

pub struct EmbedderCache {
    entries: DashMap<String, Arc<OnceCell<Arc<Embedder>>>>,
    loader: EmbedderLoader,
}

impl fmt::Debug for EmbedderCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedderCache")
            .field("models", &self.model_ids())
            .finish()
    }
}

impl EmbedderCache {
    /// A cache that constructs embedders with `Embedder::load`.
    pub fn new(options: EmbedderOptions) -> Self {
        Self::with_loader(Arc::new(move |model_id: &str| Embedder::load(model_id, &options)))
    }

    /// A cache with a custom construction function.
    pub fn with_loader(loader: EmbedderLoader) -> Self {
        Self {
            entries: DashMap::new(),
            loader,
        }
    }

    /// Return the embedder for `model_id`, constructing it on first use.
    pub fn get_or_create(&self, model_id: &str) -> Result<Arc<Embedder>, StyleScopeError> {
        if let Some(existing) = self.entries.get(model_id).and_then(|cell| cell.get().cloned()) {
            return Ok(existing);
        }

        // Clone the cell out so the map shard is not locked during construction.
        let cell = self
            .entries
            .entry(model_id.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let embedder = cell.get_or_try_init(|| (self.loader)(model_id).map(Arc::new))?;
        Ok(embedder.clone())
    }

    /// Construct every listed model up front. Stops at the first failure.
    pub fn preload<S: AsRef<str>>(&self, model_ids: &[S]) -> Result<(), StyleScopeError> {
        for id in model_ids {
            self.get_or_create(id.as_ref())?;
        }
        Ok(())
    }

    /// Whether `model_id` has a constructed embedder.
    pub fn contains(&self, model_id: &str) -> bool {
        self.entries
            .get(model_id)
            .map(|cell| cell.get().is_some())
            .unwrap_or(false)
    }

    /// Ids with a constructed embedder, sorted.
    pub fn model_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }

    /// Number of constructed embedders.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EmbedderCache {
    fn default() -> Self {
        Self::new(EmbedderOptions::default())
    }
}
