//! CSV counts loader.
//!
//! # CSV format
//!
//! One row per stop and hour.  Hours are 1-based, as in the field-count
//! exports: hour 1 covers 00:00–01:00.
//!
//! ```csv
//! stop_id,hour,count
//! 12,7,130
//! 12,8,210.5
//! 40,7,88
//! ```
//!
//! Any malformed row aborts the load.  Calibrating against partially read
//! reference data would silently skew every offset.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use cal_core::{StopId, TimeBin};

use crate::{CountsError, CountsResult, ObservedCounts};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CountRecord {
    stop_id: u32,
    hour:    u32,
    count:   f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load observed counts from a CSV file.
pub fn load_counts_csv(path: &Path) -> CountsResult<ObservedCounts> {
    let file = std::fs::File::open(path)?;
    let counts = load_counts_reader(file)?;
    log::info!("loaded {} observed counts from {}", counts.len(), path.display());
    Ok(counts)
}

/// Like [`load_counts_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn load_counts_reader<R: Read>(reader: R) -> CountsResult<ObservedCounts> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut counts = ObservedCounts::new();

    for (line, result) in csv_reader.deserialize::<CountRecord>().enumerate() {
        // +2: 1-based, plus the header row.
        let row_no = line + 2;
        let row = result.map_err(|e| CountsError::Parse(format!("row {row_no}: {e}")))?;

        if row.hour == 0 {
            return Err(CountsError::Parse(format!(
                "row {row_no}: hour must be >= 1 (hours are 1-based)"
            )));
        }
        if !row.count.is_finite() || row.count < 0.0 {
            return Err(CountsError::Parse(format!(
                "row {row_no}: count must be a finite non-negative number, got {}",
                row.count
            )));
        }

        let stop = StopId(row.stop_id);
        if counts.insert(stop, TimeBin(row.hour - 1), row.count).is_some() {
            return Err(CountsError::Parse(format!(
                "row {row_no}: duplicate count for stop {} hour {}",
                row.stop_id, row.hour
            )));
        }
    }

    Ok(counts)
}
