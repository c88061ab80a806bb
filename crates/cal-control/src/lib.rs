//! `cal-control`: the per-iteration calibration state machine.
//!
//! # Phases
//!
//! ```text
//! CalibrationBuilder (Idle)
//!   └─ startup()               load counts, build components      → Started
//! for each iteration i:
//!   ① before_iteration(i)      zero counters, clear steps          → Resetting → Accumulating
//!   ② handle_event(e) × N      count + track steps (hot path)
//!   ③ after_simulation(i)      close steps; occupancy dump if due  → Reporting
//!   ④ iteration_ends(i)        offsets, offset file, comparisons   → OffsetUpdating
//! finish()                                                         → Finished
//! ```
//!
//! Every phase is a named method; calling one out of order returns
//! [`ControlError::Phase`] and changes nothing.  Once `startup` has
//! succeeded no phase returns an error for I/O trouble: failed writes are
//! logged and listed in the [`IterationSummary`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use cal_control::CalibrationBuilder;
//! use cal_engine::ProportionalEngine;
//!
//! let mut ctl = CalibrationBuilder::new(config, ProportionalEngine::default()).startup()?;
//! let summaries = ctl.run(&mut my_mobsim, 0..=100)?;
//! ```

pub mod builder;
pub mod controller;
pub mod error;
pub mod source;
pub mod summary;

#[cfg(test)]
mod tests;

pub use builder::CalibrationBuilder;
pub use controller::{IterationController, Phase};
pub use error::{ControlError, ControlResult};
pub use source::EventSource;
pub use summary::{DataWarning, IterationSummary};
