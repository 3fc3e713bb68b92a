//! Metadata collaborator abstraction
//!
//! The ranking engine never touches descriptive data; only the HTTP layer asks a
//! provider for it once results are ranked. Remote content APIs plug in behind
//! the same trait.

use std::sync::Arc;

use tracing::instrument;

use crate::{
    error::AppResult,
    models::{Title, TitleMetadata},
    services::catalogue::Catalogue,
};

/// Trait for title metadata sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetches display metadata for a catalogue title
    async fn fetch(&self, title: &Title) -> AppResult<TitleMetadata>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Serves metadata from the catalogue's own descriptive columns
pub struct CatalogueMetadataProvider {
    catalogue: Arc<Catalogue>,
}

impl CatalogueMetadataProvider {
    pub fn new(catalogue: Arc<Catalogue>) -> Self {
        Self { catalogue }
    }
}

#[async_trait::async_trait]
impl MetadataProvider for CatalogueMetadataProvider {
    #[instrument(skip(self, title), fields(title = %title.display_name))]
    async fn fetch(&self, title: &Title) -> AppResult<TitleMetadata> {
        // Prefer the stored entry so callers holding a partial title still get every column.
        let entry = self
            .catalogue
            .title_at(title.row_index)
            .filter(|t| t.display_name == title.display_name)
            .unwrap_or(title);

        Ok(TitleMetadata {
            title: entry.display_name.clone(),
            summary: entry.summary.clone(),
            poster_url: entry.poster_url.clone(),
            genres: entry.genres.clone(),
            rating: entry.display_rating(),
            ..Default::default()
        })
    }

    fn name(&self) -> &'static str {
        "catalogue"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Arc<Catalogue> {
        let mut bebop = Title::new(0, "Cowboy Bebop");
        bebop.summary = Some("Bounty hunters drift through space.".to_string());
        bebop.rating = Some(8.75);
        bebop.poster_url = Some("https://img.example/bebop.jpg".to_string());
        bebop.genres = vec!["Action".to_string(), "Sci-Fi".to_string()];

        Arc::new(Catalogue::new(vec![bebop, Title::new(1, "Mushishi")]))
    }

    #[tokio::test]
    async fn test_fetch_from_catalogue() {
        let catalogue = catalogue();
        let provider = CatalogueMetadataProvider::new(catalogue.clone());

        let metadata = provider.fetch(&Title::new(0, "Cowboy Bebop")).await.unwrap();
        assert_eq!(metadata.title, "Cowboy Bebop");
        assert_eq!(metadata.rating, Some(8.8));
        assert_eq!(metadata.genre_text(), "Action, Sci-Fi");
        assert_eq!(metadata.poster_url.as_deref(), Some("https://img.example/bebop.jpg"));
        assert_eq!(metadata.trailer_url, None);
        assert!(metadata.cast.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_sparse_entry() {
        let provider = CatalogueMetadataProvider::new(catalogue());
        let metadata = provider.fetch(&Title::new(1, "Mushishi")).await.unwrap();

        assert_eq!(metadata.title, "Mushishi");
        assert_eq!(metadata.summary, None);
        assert_eq!(provider.name(), "catalogue");
    }
}
