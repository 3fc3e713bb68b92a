use serde::Deserialize;

use crate::{
    error::AppResult,
    services::{BatchedScan, ScanStrategy, DEFAULT_K},
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Catalogue CSV, one title per row in matrix order
    #[serde(default = "default_catalogue_path")]
    pub catalogue_path: String,

    /// Persisted similarity matrix
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Recommendations returned when a request gives no `k`
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Upper bound on `k` accepted from clients
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Columns per batched scan task
    #[serde(default = "default_scan_chunk_size")]
    pub scan_chunk_size: usize,

    /// Batched scan worker threads; 0 scans rows sequentially
    #[serde(default)]
    pub scan_workers: usize,
}

fn default_catalogue_path() -> String {
    "data/catalogue.csv".to_string()
}

fn default_similarity_path() -> String {
    "data/similarity.bin".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_max_k() -> usize {
    50
}

fn default_scan_chunk_size() -> usize {
    crate::services::scan::DEFAULT_CHUNK_SIZE
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Builds the row scan strategy described by `scan_workers` and `scan_chunk_size`
    pub fn scan_strategy(&self) -> AppResult<ScanStrategy> {
        if self.scan_workers == 0 {
            return Ok(ScanStrategy::Sequential);
        }
        BatchedScan::new(self.scan_chunk_size, self.scan_workers).map(ScanStrategy::Batched)
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
