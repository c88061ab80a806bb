use thiserror::Error;

#[derive(Debug, Error)]
pub enum CountsError {
    #[error("counts parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CountsResult<T> = Result<T, CountsError>;
