//! Per-iteration bookkeeping returned by `iteration_ends`.

use std::path::PathBuf;

use cal_analysis::StepSummary;
use cal_core::BinSize;
use cal_output::ReportOutcome;

/// A recoverable data problem.  Logged when it happens; never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataWarning {
    /// Comparison skipped because bins are not hourly.
    BinSizeMismatch { bin_size: BinSize },
    /// Trajectory steps left open at iteration end and discarded.
    IncompleteSteps { count: usize },
}

/// What happened in one iteration.
#[derive(Debug, Default)]
pub struct IterationSummary {
    pub iteration:      u32,
    /// Events at calibrated stops.
    pub events_counted: u64,
    /// Events delivered outside the accumulation phase and ignored.
    pub events_dropped: u64,
    pub steps:          StepSummary,
    /// Number of offsets computed (one per calibrated stop for the shipped
    /// engines).
    pub offsets:        usize,
    /// Files written this iteration.
    pub artifacts:      Vec<PathBuf>,
    /// One message per artifact that could not be written.
    pub io_failures:    Vec<String>,
    pub warnings:       Vec<DataWarning>,
    /// `None` only if the reporter was not reached.
    pub report:         Option<ReportOutcome>,
}

impl IterationSummary {
    pub(crate) fn new(iteration: u32) -> Self {
        Self { iteration, ..Self::default() }
    }

    /// `true` when every artifact was written.
    pub fn is_clean(&self) -> bool {
        self.io_failures.is_empty()
    }
}
