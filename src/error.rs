use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForensicsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Comparison failed: {0}")]
    RuntimeFailure(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForensicsError {
    /// True for failures caused by the caller's arguments rather than the computation.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ForensicsError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, ForensicsError>;
