//! A no-op engine: every calibrated stop gets offset 0.

use cal_analysis::SimResults;
use cal_counts::ObservedCounts;

use crate::{CalibrationEngine, CostOffsets};

/// A [`CalibrationEngine`] that never adjusts anything.
///
/// Useful as a placeholder in tests or to run the measurement side of the
/// loop (diagnostics, comparisons) without feeding anything back.
pub struct NoopEngine;

impl CalibrationEngine for NoopEngine {
    fn compute_offsets(&mut self, sim: &SimResults<'_>, _observed: &ObservedCounts) -> CostOffsets {
        sim.entities().iter().map(|(_, spec)| (spec.stop, 0.0)).collect()
    }

    fn name(&self) -> &str {
        "noop"
    }
}
