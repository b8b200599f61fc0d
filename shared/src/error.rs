//! Errors raised by persistence adapters.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("storage unavailable: {0}")]
    Storage(String),

    #[error("malformed task data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("task not found: {0}")]
    NotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, TaskError>;
