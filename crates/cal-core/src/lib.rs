//! `cal-core`: foundational types for the `rust_cal` calibration loop.
//!
//! This crate is a dependency of every other `cal-*` crate.  It has no
//! `cal-*` dependencies and minimal external ones (`thiserror`, `log`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `StopId`, `EntityId`                       |
//! | [`geo`]         | `GeoPoint`, haversine distance                        |
//! | [`time`]        | `BinSize`, `TimeBin`, `BinLayout`                     |
//! | [`entity`]      | `EntitySpec`, `EntityRegistry` (dense arena)          |
//! | [`event`]       | `SimEvent`, `CountKind`                               |
//! | [`config`]      | `CalibrationConfig`, `DistanceFilter`, `OutputFormats`|
//! | [`error`]       | `CalError`, `CalResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required to load `CalibrationConfig` from JSON.            |

pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod geo;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CalibrationConfig, DistanceFilter, OutputFormats};
pub use entity::{EntityRegistry, EntitySpec};
pub use error::{CalError, CalResult};
pub use event::{CountKind, SimEvent};
pub use geo::GeoPoint;
pub use ids::{AgentId, EntityId, StopId};
pub use time::{BinLayout, BinSize, TimeBin};
