use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("invalid fields: {}", .0.join(", "))]
    FieldErrors(Vec<String>),
    #[error("storage error: {0}")]
    Storage(&'static str),
}

pub type CoreResult<T> = Result<T, CoreError>;
