use std::path::Path;
use std::sync::Arc;

use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{ScoredTitle, Title},
    services::{catalogue::Catalogue, scan::ScanStrategy, similarity::SimilarityMatrix},
};

/// Number of recommendations returned when the caller does not ask for a count
pub const DEFAULT_K: usize = 5;

/// Ranks catalogue titles by their precomputed similarity to a query title.
///
/// Holds the catalogue and matrix read-only, so one instance serves any number
/// of concurrent requests.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalogue: Arc<Catalogue>,
    matrix: Arc<SimilarityMatrix>,
    strategy: ScanStrategy,
}

impl Recommender {
    /// Pairs a catalogue with its matrix, rejecting mismatched sizes
    pub fn new(
        catalogue: Arc<Catalogue>,
        matrix: Arc<SimilarityMatrix>,
        strategy: ScanStrategy,
    ) -> AppResult<Self> {
        matrix.ensure_matches(catalogue.len())?;

        Ok(Self {
            catalogue,
            matrix,
            strategy,
        })
    }

    /// Loads and cross-checks the catalogue CSV and the persisted matrix.
    ///
    /// Any failure here is fatal: the service must not start on partial data.
    pub fn load(
        catalogue_path: impl AsRef<Path>,
        similarity_path: impl AsRef<Path>,
        strategy: ScanStrategy,
    ) -> AppResult<Self> {
        let catalogue = Catalogue::load(catalogue_path)?;
        let matrix = SimilarityMatrix::load(similarity_path)?;
        let recommender = Self::new(Arc::new(catalogue), Arc::new(matrix), strategy)?;

        tracing::info!(
            titles = recommender.catalogue.len(),
            layout = recommender.matrix.layout_name(),
            strategy = recommender.strategy.name(),
            "Recommendation dataset ready"
        );

        Ok(recommender)
    }

    pub fn shared_catalogue(&self) -> Arc<Catalogue> {
        Arc::clone(&self.catalogue)
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    pub fn strategy(&self) -> &ScanStrategy {
        &self.strategy
    }

    /// Up to `k` titles most similar to `display_name`, best first, with scores.
    ///
    /// Equal scores keep ascending row order. The query title is filtered out by
    /// row index, so it never appears even when another title outscores or ties
    /// its self-similarity.
    #[instrument(skip(self), fields(strategy = self.strategy.name()))]
    pub fn recommend_scored(&self, display_name: &str, k: usize) -> AppResult<Vec<ScoredTitle>> {
        let query_row = self.catalogue.resolve(display_name)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut candidates = self.strategy.scan(&self.matrix, query_row);
        // Stable sort: ties stay in ascending column order from the scan.
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        candidates
            .into_iter()
            .filter(|&(candidate, _)| candidate != query_row)
            .take(k)
            .map(|(candidate, score)| {
                self.catalogue
                    .title_at(candidate)
                    .cloned()
                    .map(|title| ScoredTitle { title, score })
                    .ok_or_else(|| {
                        AppError::Internal(format!("Row {} missing from catalogue", candidate))
                    })
            })
            .collect()
    }

    /// Up to `k` titles most similar to `display_name`, best first.
    ///
    /// An unknown title yields an empty list; warning the user is left to the caller.
    pub fn recommend(&self, display_name: &str, k: usize) -> Vec<Title> {
        match self.recommend_scored(display_name, k) {
            Ok(scored) => scored.into_iter().map(|s| s.title).collect(),
            Err(AppError::NotFound(_)) => {
                tracing::warn!(title = %display_name, "Title not found in the dataset");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(title = %display_name, error = %e, "Recommendation failed");
                Vec::new()
            }
        }
    }
}
