//! Tab-separated comparison backend.
//!
//! Creates three files in the iteration directory, one per series:
//! - `<i>.countsCompareBoarding.txt`
//! - `<i>.countsCompareAlighting.txt`
//! - `<i>.countsCompareOccupancy.txt`

use std::path::{Path, PathBuf};

use cal_core::CountKind;

use crate::writer::ComparisonWriter;
use crate::{ComparisonRecord, ComparisonSet, OutputLayout, OutputResult};

/// Writes each comparison series to its own tab-separated file.
pub struct TxtWriter;

impl TxtWriter {
    pub fn file_name(kind: CountKind) -> &'static str {
        match kind {
            CountKind::Board     => "countsCompareBoarding.txt",
            CountKind::Alight    => "countsCompareAlighting.txt",
            CountKind::Occupancy => "countsCompareOccupancy.txt",
        }
    }

    fn write_series(path: &Path, set: &ComparisonSet<'_>, records: &[ComparisonRecord]) -> OutputResult<()> {
        let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
        wtr.write_record(["stop", "name", "hour", "simulated", "observed", "sim_obs_ratio", "distance_m"])?;

        let opt = |v: Option<f64>| v.map(|x| format!("{x:.4}")).unwrap_or_default();
        for r in records {
            wtr.write_record(&[
                r.stop.0.to_string(),
                set.registry.spec(r.entity).name.clone(),
                r.bin.hour_label().to_string(),
                format!("{:.4}", r.simulated),
                opt(r.observed),
                opt(r.ratio()),
                opt(r.distance_m),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ComparisonWriter for TxtWriter {
    fn format(&self) -> &'static str {
        "txt"
    }

    fn write(&self, iteration: u32, set: &ComparisonSet<'_>, layout: &OutputLayout) -> OutputResult<Vec<PathBuf>> {
        let mut files = Vec::with_capacity(CountKind::COUNT);
        for kind in CountKind::ALL {
            let path = layout.iteration_file(iteration, Self::file_name(kind));
            Self::write_series(&path, set, set.series(kind))?;
            files.push(path);
        }
        Ok(files)
    }
}
