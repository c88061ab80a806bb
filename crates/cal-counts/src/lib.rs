//! `cal-counts`: observed (field) counts and CSV loading.
//!
//! # Crate layout
//!
//! | Module      | Contents                                          |
//! |-------------|---------------------------------------------------|
//! | [`store`]   | `ObservedCounts`: `(stop, bin) → value`          |
//! | [`loader`]  | `load_counts_csv`, `load_counts_reader`           |
//! | [`error`]   | `CountsError`, `CountsResult<T>`                  |
//!
//! Observed counts are loaded once at startup and never mutated.  The format
//! is hourly: row `hour = h` covers simulated seconds `[(h-1)·3600, h·3600)`
//! and maps to time bin `h - 1`.

pub mod error;
pub mod loader;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::{CountsError, CountsResult};
pub use loader::{load_counts_csv, load_counts_reader};
pub use store::ObservedCounts;
