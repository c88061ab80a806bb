//! `ProportionalEngine`: a deterministic reference engine.
//!
//! For every calibrated stop:
//!
//! ```text
//! offset = gain · Σ_b (observed_b − simulated_b) / max(observed_b, min_std)
//! ```
//!
//! summed over the field hours that have an observation.  Simulated volumes
//! are regrouped into those hours first, so any bin size works.  Stops without any
//! observation get 0.  A positive offset means the stop is under-served and
//! should become more attractive.  Only the current iteration's volumes
//! enter the sum.

use std::path::{Path, PathBuf};

use serde::Serialize;

use cal_analysis::SimResults;
use cal_counts::ObservedCounts;

use crate::{CalibrationEngine, CostOffsets, EngineResult};

#[derive(Serialize)]
struct FlowRecord<'a> {
    stop_id:         u32,
    name:            &'a str,
    observed_total:  f64,
    simulated_total: f64,
    offset:          f64,
}

/// Relative-mismatch engine.  See the module docs for the formula.
pub struct ProportionalEngine {
    gain:          f64,
    /// Floor on the denominator so near-zero observations don't explode.
    min_std:       f64,
    flow_analysis: Option<PathBuf>,
    previous:      CostOffsets,
}

impl ProportionalEngine {
    pub fn new(gain: f64, min_std: f64) -> Self {
        Self {
            gain,
            min_std: min_std.max(f64::MIN_POSITIVE),
            flow_analysis: None,
            previous: CostOffsets::new(),
        }
    }

    fn write_flow_analysis(path: &Path, rows: &[FlowRecord<'_>]) -> EngineResult<()> {
        let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl Default for ProportionalEngine {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl CalibrationEngine for ProportionalEngine {
    fn compute_offsets(&mut self, sim: &SimResults<'_>, observed: &ObservedCounts) -> CostOffsets {
        let registry = sim.entities();
        let mut offsets = CostOffsets::new();
        let mut rows = Vec::with_capacity(registry.len());

        for (entity, spec) in registry.iter() {
            let mut mismatch = 0.0;
            let mut obs_total = 0.0;
            let mut sim_total = 0.0;
            for (hour, obs) in observed.series(spec.stop) {
                let simulated = sim.hourly_volume(entity, hour);
                mismatch += (obs - simulated) / obs.max(self.min_std);
                obs_total += obs;
                sim_total += simulated;
            }

            let offset = self.gain * mismatch;
            offsets.insert(spec.stop, offset);
            rows.push(FlowRecord {
                stop_id:         spec.stop.0,
                name:            &spec.name,
                observed_total:  obs_total,
                simulated_total: sim_total,
                offset,
            });
        }

        if let Some(path) = &self.flow_analysis {
            if let Err(e) = Self::write_flow_analysis(path, &rows) {
                log::error!("could not write flow analysis to {}: {e}", path.display());
            }
        }

        let max_change = offsets
            .iter()
            .map(|(stop, v)| (v - self.previous.get(stop).unwrap_or(0.0)).abs())
            .fold(0.0, f64::max);
        log::debug!(
            "proportional engine: {} offsets, max |offset| {:.4}, max change {:.4}",
            offsets.len(),
            offsets.max_abs(),
            max_change
        );
        self.previous = offsets.clone();

        offsets
    }

    fn set_flow_analysis_file(&mut self, path: Option<PathBuf>) {
        self.flow_analysis = path;
    }

    fn resume_from(&mut self, offsets: &CostOffsets) {
        self.previous = offsets.clone();
    }

    fn name(&self) -> &str {
        "proportional"
    }
}
