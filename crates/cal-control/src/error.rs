use std::path::PathBuf;

use cal_core::CalError;
use cal_counts::CountsError;
use cal_engine::EngineError;
use thiserror::Error;

use crate::Phase;

#[derive(Debug, Error)]
pub enum ControlError {
    /// Invalid configuration.  Startup only.
    #[error(transparent)]
    Config(#[from] CalError),

    /// Observed counts could not be read.  Startup only; there is nothing to
    /// calibrate against.
    #[error("observed counts {}: {source}", path.display())]
    Counts {
        path:   PathBuf,
        #[source]
        source: CountsError,
    },

    /// The resume offsets file exists but is unreadable.  Startup only.
    #[error("resume offsets {}: {source}", path.display())]
    Offsets {
        path:   PathBuf,
        #[source]
        source: EngineError,
    },

    /// A phase method was called out of order.
    #[error("cannot {action} for iteration {iteration} while {phase:?}")]
    Phase {
        action:    &'static str,
        iteration: u32,
        phase:     Phase,
    },
}

pub type ControlResult<T> = Result<T, ControlError>;
