//! Error types for cal-analysis.

use thiserror::Error;

/// Errors from writing diagnostic dumps.  The in-memory counters are never
/// affected by a failed write.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
