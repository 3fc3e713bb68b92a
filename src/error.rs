use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;

/// Failures while loading the catalogue or the similarity matrix at startup
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalogue: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalogue is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Catalogue row {row}: invalid {column} value '{value}'")]
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Corrupt similarity matrix: {0}")]
    Decode(#[from] bincode::Error),

    #[error("Invalid similarity matrix shape: {0}")]
    Shape(String),
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Similarity matrix has {matrix} rows but the catalogue has {catalogue} titles")]
    Consistency { matrix: usize, catalogue: usize },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Load(_) | AppError::Consistency { .. } | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_message() {
        let err = AppError::Consistency {
            matrix: 3,
            catalogue: 4,
        };
        assert_eq!(
            err.to_string(),
            "Similarity matrix has 3 rows but the catalogue has 4 titles"
        );
    }

    #[test]
    fn test_status_codes() {
        let not_found = AppError::NotFound("Naruto".to_string()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = AppError::InvalidInput("k".to_string()).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let load = AppError::Load(LoadError::MissingColumn("Title")).into_response();
        assert_eq!(load.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
