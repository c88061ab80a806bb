//! `cal-engine`: the calibration engine seam and cost-offset persistence.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                  |
//! |------------------|-----------------------------------------------------------|
//! | [`engine`]       | `CalibrationEngine` trait                                 |
//! | [`offsets`]      | `CostOffsets`: `StopId → offset`                         |
//! | [`persist`]      | `write_offsets`, `read_offsets`                           |
//! | [`noop`]         | `NoopEngine`: zero offset for every stop                 |
//! | [`proportional`] | `ProportionalEngine`: relative-mismatch reference engine |
//! | [`error`]        | `EngineError`, `EngineResult<T>`                          |
//!
//! # Design notes
//!
//! The optimizer is a black box behind [`CalibrationEngine`].  The loop
//! hands it a [`SimResults`][cal_analysis::SimResults] view and the observed
//! counts by shared reference once per iteration end and takes back a full
//! offset map.  Any internal state (history, step sizes) is the engine's own
//! business; the loop never inspects it.

pub mod engine;
pub mod error;
pub mod noop;
pub mod offsets;
pub mod persist;
pub mod proportional;


pub use engine::CalibrationEngine;
pub use error::{EngineError, EngineResult};
pub use noop::NoopEngine;
pub use offsets::CostOffsets;
pub use persist::{read_offsets, write_offsets};
pub use proportional::ProportionalEngine;
