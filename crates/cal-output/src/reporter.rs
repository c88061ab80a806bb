//! `ComparisonReporter`: gated simulated-vs-observed reports.
//!
//! # Gates
//!
//! A report is written only if all of the following hold, checked in order:
//!
//! 1. the bin size is one hour; the observed-counts format is hourly, so
//!    any other bin size would compare mismatched intervals;
//! 2. alighting reference counts are configured;
//! 3. `iteration % interval == 0`.
//!
//! Gates 2 and 3 look like two spellings of "is reporting on", but they are
//! configured independently and are evaluated independently.

use std::path::PathBuf;
use std::time::Instant;

use cal_analysis::EventAggregator;
use cal_core::{BinSize, CalibrationConfig, CountKind, DistanceFilter, OutputFormats};
use cal_counts::ObservedCounts;

use crate::writer::ComparisonWriter;
use crate::{ComparisonSet, KmlWriter, OutputLayout, TxtWriter, build_comparison};

/// Everything a report reads.  All borrowed; the reporter owns no counts.
pub struct ReportInputs<'a> {
    pub aggregator: &'a EventAggregator,
    pub occupancy:  &'a ObservedCounts,
    /// `None` → every boarding record has no observation.
    pub board:      Option<&'a ObservedCounts>,
    /// `None` → reporting is off (gate 2).
    pub alight:     Option<&'a ObservedCounts>,
    pub layout:     &'a OutputLayout,
}

/// Why a report was not written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Bin size is not one hour.  Logged as a warning.
    BinSizeMismatch { bin_size: BinSize },
    /// No alighting reference counts configured.
    NoReferenceCounts,
    /// Not a reporting iteration.
    NotActive,
}

/// Result of one [`ComparisonReporter::report`] call.
#[derive(Debug, PartialEq)]
pub enum ReportOutcome {
    Skipped(SkipReason),
    /// Comparisons were built.  `failures` holds one message per backend
    /// that could not write; the files of other backends are still listed.
    Written { files: Vec<PathBuf>, failures: Vec<String> },
}

/// Builds and writes comparison reports on gated iterations.
pub struct ComparisonReporter {
    interval:     u32,
    scale_factor: f64,
    filter:       Option<DistanceFilter>,
    writers:      Vec<Box<dyn ComparisonWriter>>,
}

impl ComparisonReporter {
    pub fn new(interval: u32, scale_factor: f64, filter: Option<DistanceFilter>, formats: OutputFormats) -> Self {
        let mut writers: Vec<Box<dyn ComparisonWriter>> = Vec::new();
        if formats.kml {
            writers.push(Box::new(KmlWriter));
        }
        if formats.txt {
            writers.push(Box::new(TxtWriter));
        }
        Self { interval, scale_factor, filter, writers }
    }

    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self::new(
            config.counts_interval,
            config.counts_scale_factor,
            config.distance_filter,
            config.formats(),
        )
    }

    /// Check the gates and, if they pass, build and write all comparisons.
    ///
    /// Never fails: write errors are logged and returned in the outcome.
    pub fn report(&self, iteration: u32, inputs: &ReportInputs<'_>) -> ReportOutcome {
        let bin_size = inputs.aggregator.layout().size();
        if !bin_size.is_hourly() {
            log::warn!(
                "it={iteration} counts comparison needs hourly time bins (configured: {bin_size}); skipping the comparison"
            );
            return ReportOutcome::Skipped(SkipReason::BinSizeMismatch { bin_size });
        }

        let Some(alight) = inputs.alight else {
            return ReportOutcome::Skipped(SkipReason::NoReferenceCounts);
        };

        if self.interval == 0 || !iteration.is_multiple_of(self.interval) {
            return ReportOutcome::Skipped(SkipReason::NotActive);
        }

        let started = Instant::now();
        let empty = ObservedCounts::new();
        let board = inputs.board.unwrap_or(&empty);
        let build = |kind: CountKind, observed: &ObservedCounts| {
            build_comparison(kind, inputs.aggregator, observed, self.scale_factor, self.filter.as_ref())
        };

        let set = ComparisonSet {
            registry:  inputs.aggregator.registry(),
            bin_size,
            board:     build(CountKind::Board, board),
            alight:    build(CountKind::Alight, alight),
            occupancy: build(CountKind::Occupancy, inputs.occupancy),
        };

        let mut files = Vec::new();
        let mut failures = Vec::new();

        if !self.writers.is_empty() {
            if let Err(e) = inputs.layout.prepare_iteration(iteration) {
                log::error!("it={iteration} could not create iteration directory: {e}");
                failures.push(format!("iteration directory: {e}"));
                return ReportOutcome::Written { files, failures };
            }
        }

        for writer in &self.writers {
            match writer.write(iteration, &set, inputs.layout) {
                Ok(paths) => files.extend(paths),
                Err(e) => {
                    log::error!("it={iteration} could not write {} comparison: {e}", writer.format());
                    failures.push(format!("{}: {e}", writer.format()));
                }
            }
        }

        log::info!(
            "it={iteration} compared {} stops with counts in {:.2?} ({} files)",
            set.stop_count(),
            started.elapsed(),
            files.len()
        );
        ReportOutcome::Written { files, failures }
    }
}
