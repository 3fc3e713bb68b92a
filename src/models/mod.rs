use serde::{Deserialize, Serialize};

pub mod metadata;
pub mod title;

pub use metadata::{CastMember, Person, TitleMetadata};
pub use title::{ScoredTitle, Title};

/// Warning returned alongside an empty result when the query title is unknown
pub const TITLE_NOT_FOUND_WARNING: &str = "Title not found in the dataset.";

/// Query string for the recommendations endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
    pub k: Option<usize>,
}

/// One ranked entry in a recommendation response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedTitle {
    pub row_index: usize,
    pub display_name: String,
    /// Content API item id, used to fetch posters, cast and trailers
    pub external_id: Option<u64>,
    pub score: f32,
    #[serde(default)]
    pub genres: Vec<String>,
    pub rating: Option<f32>,
    pub poster_url: Option<String>,
    pub summary: Option<String>,
}

impl From<ScoredTitle> for RecommendedTitle {
    fn from(scored: ScoredTitle) -> Self {
        let rating = scored.title.display_rating();
        Self {
            row_index: scored.title.row_index,
            display_name: scored.title.display_name,
            external_id: scored.title.external_id,
            score: scored.score,
            genres: scored.title.genres,
            rating,
            poster_url: scored.title.poster_url,
            summary: scored.title.summary,
        }
    }
}

/// Ranked titles similar to `title`, best first
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub title: String,
    pub k: usize,
    pub recommendations: Vec<RecommendedTitle>,
    /// Set when the result is empty because the query could not be served
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
