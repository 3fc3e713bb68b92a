use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::{
    error::{AppError, AppResult, LoadError},
    models::Title,
};

const NAME_COLUMNS: &[&str] = &["title", "display_name", "name"];
const SUMMARY_COLUMNS: &[&str] = &["summary", "overview"];
const RATING_COLUMNS: &[&str] = &["rating", "vote_average"];
const POSTER_COLUMNS: &[&str] = &["poster", "poster_url"];
const ID_COLUMNS: &[&str] = &["movie_id", "id"];
const GENRE_COLUMNS: &[&str] = &["genres", "genre"];

/// Ordered list of recommendable titles plus a name index.
///
/// Row order defines `row_index` and must match the similarity matrix.
#[derive(Debug, Clone)]
pub struct Catalogue {
    titles: Vec<Title>,
    by_name: HashMap<String, usize>,
}

/// Column positions resolved from the CSV header
struct Columns {
    name: usize,
    summary: Option<usize>,
    rating: Option<usize>,
    poster: Option<usize>,
    external_id: Option<usize>,
    genres: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |aliases: &[&str]| {
            headers
                .iter()
                .position(|h| aliases.iter().any(|a| h.trim().eq_ignore_ascii_case(a)))
        };

        Ok(Self {
            name: find(NAME_COLUMNS).ok_or(LoadError::MissingColumn("Title"))?,
            summary: find(SUMMARY_COLUMNS),
            rating: find(RATING_COLUMNS),
            poster: find(POSTER_COLUMNS),
            external_id: find(ID_COLUMNS),
            genres: find(GENRE_COLUMNS),
        })
    }
}

/// Returns the trimmed field at `column`, treating blanks as absent
fn field(record: &StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|c| record.get(c))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_field<T: std::str::FromStr>(
    record: &StringRecord,
    column: Option<usize>,
    row: usize,
    label: &'static str,
) -> Result<Option<T>, LoadError> {
    field(record, column)
        .map(|raw| {
            raw.parse::<T>().map_err(|_| LoadError::InvalidField {
                row,
                column: label,
                value: raw.to_string(),
            })
        })
        .transpose()
}

impl Catalogue {
    /// Builds a catalogue from titles already in row order.
    ///
    /// `row_index` is reassigned from position. Duplicate names are kept; lookups
    /// resolve to the first occurrence.
    pub fn new(mut titles: Vec<Title>) -> Self {
        let mut by_name = HashMap::with_capacity(titles.len());

        for (index, title) in titles.iter_mut().enumerate() {
            title.row_index = index;
            if let Some(first) = by_name.get(&title.display_name) {
                tracing::warn!(
                    title = %title.display_name,
                    first_row = first,
                    duplicate_row = index,
                    "Duplicate display name in catalogue, first occurrence wins"
                );
            } else {
                by_name.insert(title.display_name.clone(), index);
            }
        }

        Self { titles, by_name }
    }

    /// Builds a catalogue from bare names, in order
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let titles = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Title::new(index, name))
            .collect();
        Self::new(titles)
    }

    /// Parses a catalogue CSV with a header row.
    ///
    /// Only the name column is required; header matching ignores case.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let columns = Columns::from_headers(csv_reader.headers()?)?;

        let mut titles = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            // Kept verbatim: lookups match the raw cell exactly.
            let display_name = record.get(columns.name).unwrap_or_default().to_string();

            titles.push(Title {
                row_index: row,
                display_name,
                external_id: parse_field(&record, columns.external_id, row, "id")?,
                summary: field(&record, columns.summary).map(str::to_string),
                rating: parse_field(&record, columns.rating, row, "rating")?,
                poster_url: field(&record, columns.poster).map(str::to_string),
                genres: field(&record, columns.genres)
                    .map(|raw| {
                        raw.split(',')
                            .map(str::trim)
                            .filter(|g| !g.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            });
        }

        Ok(Self::new(titles))
    }

    /// Loads the catalogue CSV from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalogue = Self::from_reader(file)?;

        tracing::info!(
            path = %path.display(),
            titles = catalogue.len(),
            "Loaded catalogue"
        );

        Ok(catalogue)
    }

    /// Row index of the first title named exactly `display_name`
    pub fn resolve(&self, display_name: &str) -> AppResult<usize> {
        self.by_name.get(display_name).copied().ok_or_else(|| {
            AppError::NotFound(format!("Title '{}' is not in the catalogue", display_name))
        })
    }

    pub fn title_at(&self, row_index: usize) -> Option<&Title> {
        self.titles.get(row_index)
    }

    /// Looks a title up by name
    pub fn get(&self, display_name: &str) -> AppResult<&Title> {
        let index = self.resolve(display_name)?;
        self.title_at(index)
            .ok_or_else(|| AppError::Internal(format!("Row {} missing from catalogue", index)))
    }

    /// Distinct display names in first-occurrence order
    pub fn unique_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.titles
            .iter()
            .filter(|t| self.by_name.get(&t.display_name) == Some(&t.row_index))
            .map(|t| t.display_name.as_str())
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
