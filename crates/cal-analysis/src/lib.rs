//! `cal-analysis`: everything that consumes the simulation event stream.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`aggregator`]  | `EventAggregator`: flat `[entity][bin][kind]` counters   |
//! | [`steps`]       | `PlanStepTranslator`, `TrajectoryStep`, `StepSummary`     |
//! | [`results`]     | `SimResults`: scaled read-only view for the engine       |
//! | [`error`]       | `AnalysisError`, `AnalysisResult<T>`                      |
//!
//! # Hot path
//!
//! `EventAggregator::on_event` and `PlanStepTranslator::on_event` run once
//! per simulation event.  Neither performs I/O; an event at an uncalibrated
//! stop costs one bounds-checked array read.  Everything that writes files
//! runs between iterations.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                  |
//! |-----------|---------------------------------------------------------|
//! | `fx-hash` | FxHash for the translator's open-step cursors.          |

pub mod aggregator;
pub mod error;
pub mod results;
pub mod steps;


pub use aggregator::EventAggregator;
pub use error::{AnalysisError, AnalysisResult};
pub use results::SimResults;
pub use steps::{PlanStepTranslator, StepSummary, TrajectoryStep};
