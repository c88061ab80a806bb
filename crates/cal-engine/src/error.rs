use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("offsets parse error: {0}")]
    Parse(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
