//! Framework error type.
//!
//! Sub-crates define their own error enums; `cal-control` wraps them at the
//! startup boundary.  Only configuration problems surface as `CalError`.

use thiserror::Error;

use crate::StopId;

/// The top-level error type for `cal-core`.
#[derive(Debug, Error)]
pub enum CalError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("stop {0} is listed more than once in the calibrated set")]
    DuplicateStop(StopId),
}

/// Shorthand result type for `cal-core`.
pub type CalResult<T> = Result<T, CalError>;
