//! The seam to the host mobility simulation.

use cal_core::SimEvent;
use cal_engine::CostOffsets;

/// A simulation that can run one iteration and stream its events.
///
/// Only needed for [`IterationController::run`][crate::IterationController::run];
/// hosts that own their own loop call the phase methods directly.
///
/// # Example: replaying a recorded day
///
/// ```rust,ignore
/// struct Replay(Vec<SimEvent>);
///
/// impl EventSource for Replay {
///     fn run_iteration(&mut self, _it: u32, _offsets: &CostOffsets, sink: &mut dyn FnMut(&SimEvent)) {
///         self.0.iter().for_each(|e| sink(e));
///     }
/// }
/// ```
pub trait EventSource {
    /// Simulate `iteration` with the route-choice `offsets` from the previous
    /// iteration end, passing every event to `sink` in simulation order.
    fn run_iteration(&mut self, iteration: u32, offsets: &CostOffsets, sink: &mut dyn FnMut(&SimEvent));
}
