use crate::models::MovieId;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("catalog request failed: {0:#}")]
    Network(anyhow::Error),
    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),
    #[error("movie {0} not found")]
    NotFound(MovieId),
    #[error("configuration error: {0}")]
    Config(String),
}
