use serde::{Deserialize, Serialize};

/// A catalogue entry. `row_index` is its row and column in the similarity matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Title {
    /// Position in the catalogue, 0-based
    pub row_index: usize,
    /// Name shown to users and used as the lookup key
    pub display_name: String,
    /// Content API item id, when the catalogue provides one
    pub external_id: Option<u64>,
    pub summary: Option<String>,
    pub rating: Option<f32>,
    pub poster_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Title {
    /// Creates a title carrying only its name and position
    pub fn new(row_index: usize, display_name: impl Into<String>) -> Self {
        Self {
            row_index,
            display_name: display_name.into(),
            external_id: None,
            summary: None,
            rating: None,
            poster_url: None,
            genres: Vec::new(),
        }
    }

    /// Rating rounded to one decimal place for display
    pub fn display_rating(&self) -> Option<f32> {
        self.rating.map(|r| (r * 10.0).round() / 10.0)
    }
}

/// A recommended title together with its similarity to the query
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredTitle {
    pub title: Title,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_title() {
        let title = Title::new(3, "Cowboy Bebop");
        assert_eq!(title.row_index, 3);
        assert_eq!(title.display_name, "Cowboy Bebop");
        assert!(title.genres.is_empty());
        assert_eq!(title.rating, None);
    }

    #[test]
    fn test_display_rating_rounds() {
        let mut title = Title::new(0, "Steins;Gate");
        title.rating = Some(9.07);
        assert_eq!(title.display_rating(), Some(9.1));
    }
}
