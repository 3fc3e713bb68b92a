use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    error::{AppError, AppResult},
    services::similarity::SimilarityMatrix,
};

/// Default number of columns each worker materialises at a time
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// How a similarity row is materialised before ranking.
///
/// Both strategies yield the same `(column, score)` pairs in column order;
/// batching only changes throughput.
#[derive(Debug, Clone, Default)]
pub enum ScanStrategy {
    #[default]
    Sequential,
    Batched(BatchedScan),
}

/// Chunked row scan on a dedicated, bounded thread pool
#[derive(Debug, Clone)]
pub struct BatchedScan {
    chunk_size: usize,
    pool: Arc<rayon::ThreadPool>,
}

impl BatchedScan {
    /// Creates a batched scan with `workers` threads reading `chunk_size` columns per task
    pub fn new(chunk_size: usize, workers: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::InvalidInput(
                "Scan chunk size must be at least 1".to_string(),
            ));
        }
        if workers == 0 {
            return Err(AppError::InvalidInput(
                "Batched scan needs at least one worker".to_string(),
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("row-scan-{}", index))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to start scan workers: {}", e)))?;

        Ok(Self {
            chunk_size,
            pool: Arc::new(pool),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn scan(&self, matrix: &SimilarityMatrix, row: usize) -> Vec<(usize, f32)> {
        let chunk_size = self.chunk_size;
        let starts: Vec<usize> = (0..matrix.size()).step_by(chunk_size).collect();

        let chunks: Vec<Vec<(usize, f32)>> = self.pool.install(|| {
            starts
                .par_iter()
                .map(|&start| matrix.row_range(row, start, start.saturating_add(chunk_size)))
                .collect()
        });

        tracing::trace!(row, chunks = chunks.len(), chunk_size, "Batched row scan");

        chunks.into_iter().flatten().collect()
    }
}

impl ScanStrategy {
    /// Materialises every `(column, score)` pair of `row`
    pub fn scan(&self, matrix: &SimilarityMatrix, row: usize) -> Vec<(usize, f32)> {
        match self {
            ScanStrategy::Sequential => matrix.row(row),
            ScanStrategy::Batched(batched) => batched.scan(matrix, row),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScanStrategy::Sequential => "sequential",
            ScanStrategy::Batched(_) => "batched",
        }
    }
}
