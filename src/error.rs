use crate::models::MarginStage;

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Margin {value} for stage {stage} is outside [0, 1)")]
    InvalidMargin { stage: MarginStage, value: f64 },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Service error: {0}")]
    Service(String),
}

pub type Result<T> = std::result::Result<T, MarketError>;
