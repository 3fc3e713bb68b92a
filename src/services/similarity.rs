use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, LoadError};

/// On-disk form of the similarity matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedMatrix {
    size: u64,
    layout: Layout,
}

/// Score storage. Sparse rows list `(column, score)`; absent columns score 0.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Layout {
    Dense(Vec<f32>),
    Sparse(Vec<Vec<(u32, f32)>>),
}

/// Precomputed pairwise similarity between catalogue titles.
///
/// Immutable once built; `row(i)` yields the scores from title `i` to every
/// title, itself included.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    size: usize,
    layout: Layout,
}

impl SimilarityMatrix {
    /// Builds a dense matrix from row-major scores
    pub fn from_dense(size: usize, scores: Vec<f32>) -> Result<Self, LoadError> {
        let expected = size
            .checked_mul(size)
            .ok_or_else(|| LoadError::Shape(format!("size {} overflows", size)))?;
        if scores.len() != expected {
            return Err(LoadError::Shape(format!(
                "dense buffer holds {} scores, expected {}x{}",
                scores.len(),
                size,
                size
            )));
        }

        Ok(Self {
            size,
            layout: Layout::Dense(scores),
        })
    }

    /// Builds a sparse matrix. Each row is normalised to ascending column order.
    pub fn from_sparse(size: usize, mut rows: Vec<Vec<(u32, f32)>>) -> Result<Self, LoadError> {
        if rows.len() != size {
            return Err(LoadError::Shape(format!(
                "sparse matrix has {} rows, expected {}",
                rows.len(),
                size
            )));
        }

        for (index, row) in rows.iter_mut().enumerate() {
            if let Some(&(column, _)) = row.iter().find(|(c, _)| *c as usize >= size) {
                return Err(LoadError::Shape(format!(
                    "row {} references column {} outside 0..{}",
                    index, column, size
                )));
            }
            row.sort_by_key(|(column, _)| *column);
            if row.windows(2).any(|pair| pair[0].0 == pair[1].0) {
                return Err(LoadError::Shape(format!(
                    "row {} lists a column more than once",
                    index
                )));
            }
        }

        Ok(Self {
            size,
            layout: Layout::Sparse(rows),
        })
    }

    /// Decodes a persisted matrix
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let persisted: PersistedMatrix = bincode::deserialize_from(reader)?;
        let size = usize::try_from(persisted.size)
            .map_err(|_| LoadError::Shape(format!("size {} overflows", persisted.size)))?;

        match persisted.layout {
            Layout::Dense(scores) => Self::from_dense(size, scores),
            Layout::Sparse(rows) => Self::from_sparse(size, rows),
        }
    }

    /// Loads the persisted matrix from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let matrix = Self::from_reader(BufReader::new(file))?;

        tracing::info!(
            path = %path.display(),
            size = matrix.size(),
            layout = matrix.layout_name(),
            "Loaded similarity matrix"
        );

        Ok(matrix)
    }

    /// Encodes the matrix in its persisted form
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), LoadError> {
        let persisted = PersistedMatrix {
            size: self.size as u64,
            layout: self.layout.clone(),
        };
        bincode::serialize_into(writer, &persisted)?;
        Ok(())
    }

    /// Writes the matrix to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
        self.write_to(&mut writer)?;
        writer.flush().map_err(io_err)
    }

    /// Checks the matrix is sized for a catalogue of `catalogue_len` titles
    pub fn ensure_matches(&self, catalogue_len: usize) -> AppResult<()> {
        if self.size != catalogue_len {
            return Err(AppError::Consistency {
                matrix: self.size,
                catalogue: catalogue_len,
            });
        }
        Ok(())
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn layout_name(&self) -> &'static str {
        match self.layout {
            Layout::Dense(_) => "dense",
            Layout::Sparse(_) => "sparse",
        }
    }

    /// Score between titles `row` and `column`, 0.0 if either is out of range
    pub fn score(&self, row: usize, column: usize) -> f32 {
        if row >= self.size || column >= self.size {
            return 0.0;
        }
        match &self.layout {
            Layout::Dense(scores) => scores[row * self.size + column],
            Layout::Sparse(rows) => rows[row]
                .binary_search_by_key(&(column as u32), |(c, _)| *c)
                .map(|position| rows[row][position].1)
                .unwrap_or(0.0),
        }
    }

    /// Scores for columns `start..end` of `row`, as `(column, score)` in column order
    pub fn row_range(&self, row: usize, start: usize, end: usize) -> Vec<(usize, f32)> {
        let end = end.min(self.size);
        if row >= self.size || start >= end {
            return Vec::new();
        }

        match &self.layout {
            Layout::Dense(scores) => {
                let offset = row * self.size;
                scores[offset + start..offset + end]
                    .iter()
                    .enumerate()
                    .map(|(i, &score)| (start + i, score))
                    .collect()
            }
            Layout::Sparse(rows) => {
                let entries = &rows[row];
                let mut next = entries.partition_point(|(c, _)| (*c as usize) < start);
                (start..end)
                    .map(|column| match entries.get(next) {
                        Some(&(c, score)) if c as usize == column => {
                            next += 1;
                            (column, score)
                        }
                        _ => (column, 0.0),
                    })
                    .collect()
            }
        }
    }

    /// Every `(column, score)` of `row` in column order; empty if `row` is out of range
    pub fn row(&self, row: usize) -> Vec<(usize, f32)> {
        self.row_range(row, 0, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_abcd() -> SimilarityMatrix {
        #[rustfmt::skip]
        let scores = vec![
            1.0, 0.9, 0.9, 0.1,
            0.9, 1.0, 0.5, 0.2,
            0.9, 0.5, 1.0, 0.3,
            0.1, 0.2, 0.3, 1.0,
        ];
        SimilarityMatrix::from_dense(4, scores).unwrap()
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_dense_row() {
        let matrix = dense_abcd();
        assert_eq!(matrix.row(0), vec![(0, 1.0), (1, 0.9), (2, 0.9), (3, 0.1)]);
        assert_eq!(matrix.score(3, 2), 0.3);
    }

    #[test]
    fn test_dense_wrong_length() {
        let err = SimilarityMatrix::from_dense(3, vec![1.0; 8]).unwrap_err();
        assert!(matches!(err, LoadError::Shape(_)));
    }

    #[test]
    fn test_sparse_row_fills_missing_columns() {
        let rows = vec![vec![(2, 0.4), (0, 1.0)], vec![(1, 1.0)], vec![(2, 1.0), (0, 0.4)]];
        let matrix = SimilarityMatrix::from_sparse(3, rows).unwrap();

        assert_eq!(matrix.row(0), vec![(0, 1.0), (1, 0.0), (2, 0.4)]);
        assert_eq!(matrix.row_range(0, 1, 3), vec![(1, 0.0), (2, 0.4)]);
        assert_eq!(matrix.score(2, 0), 0.4);
        assert_eq!(matrix.score(1, 2), 0.0);
    }

    #[test]
    fn test_sparse_rejects_out_of_range_column() {
        let rows = vec![vec![(0, 1.0)], vec![(5, 0.3)]];
        let err = SimilarityMatrix::from_sparse(2, rows).unwrap_err();
        assert!(matches!(err, LoadError::Shape(_)));
    }

    #[test]
    fn test_sparse_rejects_wrong_row_count() {
        let err = SimilarityMatrix::from_sparse(3, vec![vec![]]).unwrap_err();
        assert!(matches!(err, LoadError::Shape(_)));
    }

    #[test]
    fn test_row_out_of_range_is_empty() {
        assert!(dense_abcd().row(4).is_empty());
    }

    #[test]
    fn test_ensure_matches() {
        let matrix = dense_abcd();
        assert!(matrix.ensure_matches(4).is_ok());

        let err = matrix.ensure_matches(5).unwrap_err();
        assert!(matches!(
            err,
            AppError::Consistency {
                matrix: 4,
                catalogue: 5
            }
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("similarity.bin");
        dense_abcd().save(&path).unwrap();

        let loaded = SimilarityMatrix::load(&path).unwrap();
        assert_eq!(loaded.size(), 4);
        assert_eq!(loaded.layout_name(), "dense");
        assert_eq!(loaded.row(2), dense_abcd().row(2));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_missing_blob() {
        let err = SimilarityMatrix::load(temp_path("absent.bin")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_corrupt_blob() {
        let err = SimilarityMatrix::from_reader(&b"not a matrix"[..]).unwrap_err();
        assert!(matches!(err, LoadError::Decode(_) | LoadError::Shape(_)));
    }
}
