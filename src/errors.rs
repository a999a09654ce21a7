use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("INVALID_FORMAT: {0}")]
    InvalidFormat(String),
    #[error("INVALID_PARENT: {0}")]
    InvalidParent(String),
    #[error("STORE_WRITE_FAILURE: {0}")]
    StoreWrite(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl AppError {
    pub fn project_not_found(project_id: &str) -> Self {
        Self::NotFound(format!("project {}", project_id))
    }

    pub fn canvas_not_found(canvas_id: &str) -> Self {
        Self::NotFound(format!("canvas {}", canvas_id))
    }

    pub fn block_not_found(block_id: &str) -> Self {
        Self::NotFound(format!("block {}", block_id))
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
