use serde::{Deserialize, Serialize};

/// Descriptive data for one title, as consumed by the presentation layer.
///
/// Every field except `title` is optional because content sources rarely
/// fill all of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TitleMetadata {
    pub title: String,
    pub summary: Option<String>,
    pub poster_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub rating: Option<f32>,
    pub trailer_url: Option<String>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    pub director: Option<Person>,
}

impl TitleMetadata {
    /// Genres joined for a single display line, e.g. "Action, Drama"
    pub fn genre_text(&self) -> String {
        self.genres.join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub name: String,
    pub profile_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_text() {
        let metadata = TitleMetadata {
            title: "Inception".to_string(),
            genres: vec!["Action".to_string(), "Science Fiction".to_string()],
            ..Default::default()
        };
        assert_eq!(metadata.genre_text(), "Action, Science Fiction");
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let metadata: TitleMetadata = serde_json::from_str(r#"{"title":"Akira"}"#).unwrap();
        assert_eq!(metadata.title, "Akira");
        assert!(metadata.cast.is_empty());
        assert_eq!(metadata.director, None);
    }
}
