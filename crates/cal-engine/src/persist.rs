//! Cost-offset files.
//!
//! # Format
//!
//! ```csv
//! stop_id,offset
//! 10,0.25
//! 20,-1.5
//! ```
//!
//! Rows are written in ascending stop order.  Floats are written in their
//! shortest round-trip form, so `read_offsets(write_offsets(o)) == o`.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use cal_core::StopId;

use crate::{CostOffsets, EngineError, EngineResult};

#[derive(Serialize, Deserialize)]
struct OffsetRecord {
    stop_id: u32,
    offset:  f64,
}

/// Write the full offset map to `path`, replacing any existing file.
pub fn write_offsets(path: &Path, offsets: &CostOffsets) -> EngineResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for (stop, offset) in offsets.iter() {
        wtr.serialize(OffsetRecord { stop_id: stop.0, offset })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read an offset map written by [`write_offsets`].
///
/// Returns `Ok(None)` if `path` does not exist; a run resuming from an
/// iteration that never wrote offsets simply starts from scratch.
pub fn read_offsets(path: &Path) -> EngineResult<Option<CostOffsets>> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut rdr = csv::Reader::from_reader(file);
    let mut offsets = CostOffsets::new();
    for result in rdr.deserialize::<OffsetRecord>() {
        let row = result.map_err(|e| EngineError::Parse(e.to_string()))?;
        if offsets.insert(StopId(row.stop_id), row.offset).is_some() {
            return Err(EngineError::Parse(format!("stop {} listed twice", row.stop_id)));
        }
    }
    Ok(Some(offsets))
}
