use std::sync::Arc;

use crate::services::{CatalogueMetadataProvider, MetadataProvider, Recommender, DEFAULT_K};

/// Shared application state.
///
/// Everything here is built before the listener starts and never mutated, so
/// handlers read it without locking.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub default_k: usize,
    pub max_k: usize,
}

impl AppState {
    /// State serving metadata straight from the catalogue
    pub fn new(recommender: Recommender) -> Self {
        let metadata = Arc::new(CatalogueMetadataProvider::new(
            recommender.shared_catalogue(),
        ));
        Self::with_metadata(recommender, metadata)
    }

    pub fn with_metadata(recommender: Recommender, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self {
            recommender: Arc::new(recommender),
            metadata,
            default_k: DEFAULT_K,
            max_k: 50,
        }
    }

    /// Overrides the default and maximum recommendation counts
    pub fn with_limits(mut self, default_k: usize, max_k: usize) -> Self {
        self.default_k = default_k;
        self.max_k = max_k.max(1);
        self
    }
}
