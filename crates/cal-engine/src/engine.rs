//! The `CalibrationEngine` trait: the seam to the optimizer.

use std::path::PathBuf;

use cal_analysis::SimResults;
use cal_counts::ObservedCounts;

use crate::CostOffsets;

/// Pluggable optimizer producing per-stop cost offsets.
///
/// # Contract
///
/// - [`compute_offsets`][Self::compute_offsets] is called exactly once per
///   iteration end, after the simulation phase.
/// - Identical inputs (and identical internal state) must give identical
///   output.
/// - Inputs are shared references; the engine cannot mutate the counts it
///   is scored against.
/// - The returned map replaces the previous iteration's offsets wholesale.
///
/// # Example
///
/// ```rust,ignore
/// struct Flat(f64);
///
/// impl CalibrationEngine for Flat {
///     fn compute_offsets(&mut self, sim: &SimResults<'_>, _obs: &ObservedCounts) -> CostOffsets {
///         sim.entities().iter().map(|(_, spec)| (spec.stop, self.0)).collect()
///     }
/// }
/// ```
pub trait CalibrationEngine: Send + 'static {
    /// Compare simulated volumes against `observed` and return new offsets.
    fn compute_offsets(&mut self, sim: &SimResults<'_>, observed: &ObservedCounts) -> CostOffsets;

    /// Where to write a flow-analysis table during the next
    /// `compute_offsets`; `None` disables it.
    ///
    /// Default: ignored.
    fn set_flow_analysis_file(&mut self, _path: Option<PathBuf>) {}

    /// Offsets from a previous run, delivered once at startup.
    ///
    /// Default: ignored.
    fn resume_from(&mut self, _offsets: &CostOffsets) {}

    /// Short label for log lines.
    fn name(&self) -> &str {
        "engine"
    }
}
