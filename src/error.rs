use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Catalog API error: {0}")]
    CatalogApi(String),

    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// Failures that come from the upstream catalog or its token endpoint.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::Auth(_) | AppError::CatalogApi(_) | AppError::Http(_) | AppError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
