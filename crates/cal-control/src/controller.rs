//! `IterationController`: the phase-sequenced calibration loop.

use std::ops::RangeInclusive;
use std::sync::Arc;

use cal_analysis::{EventAggregator, PlanStepTranslator, SimResults};
use cal_core::{CalibrationConfig, EntityRegistry, SimEvent};
use cal_counts::ObservedCounts;
use cal_engine::{CalibrationEngine, CostOffsets, write_offsets};
use cal_output::{ComparisonReporter, OutputLayout, ReportInputs, ReportOutcome, SkipReason};

use crate::{ControlError, ControlResult, DataWarning, EventSource, IterationSummary};

pub const OFFSETS_FILE_NAME: &str = "stopCostOffsets.csv";
pub const OCCUPANCY_DUMP_FILE_NAME: &str = "occupancyAnalysis.txt";
pub const FLOW_ANALYSIS_FILE_NAME: &str = "flowAnalysis.txt";

/// Where the loop is.  `Idle` is the [`CalibrationBuilder`][crate::CalibrationBuilder]
/// itself; `Resetting` is only observable from inside `before_iteration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Started,
    Resetting,
    Accumulating,
    Reporting,
    OffsetUpdating,
    Finished,
}

/// Observed counts, loaded once at startup.
pub(crate) struct Counts {
    pub(crate) occupancy: ObservedCounts,
    pub(crate) board:     Option<ObservedCounts>,
    pub(crate) alight:    Option<ObservedCounts>,
}

/// Drives one calibration run.  Create via
/// [`CalibrationBuilder`][crate::CalibrationBuilder].
///
/// Per iteration the host calls, in order:
///
/// 1. [`before_iteration`][Self::before_iteration]
/// 2. [`handle_event`][Self::handle_event] for every simulation event
/// 3. [`after_simulation`][Self::after_simulation]
/// 4. [`iteration_ends`][Self::iteration_ends]
///
/// and [`finish`][Self::finish] once at the end.  [`run`][Self::run] does
/// all of that for an [`EventSource`].
pub struct IterationController<E: CalibrationEngine> {
    config:     CalibrationConfig,
    registry:   Arc<EntityRegistry>,
    aggregator: EventAggregator,
    translator: PlanStepTranslator,
    reporter:   ComparisonReporter,
    layout:     OutputLayout,
    counts:     Counts,
    engine:     E,
    offsets:    CostOffsets,
    phase:      Phase,
    /// Iteration between `before_iteration` and `iteration_ends`.
    current:    Option<u32>,
    /// Filled by `after_simulation`, completed by `iteration_ends`.
    pending:    IterationSummary,
    dropped:    u64,
}

impl<E: CalibrationEngine> IterationController<E> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        aggregator: EventAggregator,
        translator: PlanStepTranslator,
        reporter:   ComparisonReporter,
        layout:     OutputLayout,
        counts:     Counts,
        engine:     E,
        offsets:    CostOffsets,
        config:     CalibrationConfig,
        registry:   Arc<EntityRegistry>,
    ) -> Self {
        Self {
            config,
            registry,
            aggregator,
            translator,
            reporter,
            layout,
            counts,
            engine,
            offsets,
            phase: Phase::Started,
            current: None,
            pending: IterationSummary::default(),
            dropped: 0,
        }
    }

    // ── Phases ────────────────────────────────────────────────────────────

    /// Zero all counters and clear all steps.  `→ Accumulating`.
    ///
    /// Valid after `startup` or after the previous `iteration_ends`.
    pub fn before_iteration(&mut self, iteration: u32) -> ControlResult<()> {
        if !matches!(self.phase, Phase::Started | Phase::OffsetUpdating) {
            return Err(self.phase_error("begin iteration", iteration));
        }

        self.phase = Phase::Resetting;
        self.aggregator.reset(iteration);
        self.translator.reset(iteration);
        self.current = Some(iteration);
        self.pending = IterationSummary::new(iteration);
        self.phase = Phase::Accumulating;
        log::debug!("it={iteration} accumulating");
        Ok(())
    }

    /// Count one simulation event.  Hot path: no I/O, no allocation for
    /// uncalibrated stops.
    ///
    /// Events outside the accumulation phase are dropped and counted in the
    /// next summary.
    #[inline]
    pub fn handle_event(&mut self, event: &SimEvent) {
        if self.phase != Phase::Accumulating {
            self.dropped += 1;
            return;
        }
        self.aggregator.on_event(event);
        self.translator.on_event(event);
    }

    /// Close the simulation phase.  `Accumulating → Reporting`.
    ///
    /// Discards open steps and, on active iterations, writes the occupancy
    /// dump for the diagnostic stops.
    pub fn after_simulation(&mut self, iteration: u32) -> ControlResult<()> {
        self.require(Phase::Accumulating, "close the simulation", iteration)?;
        self.phase = Phase::Reporting;

        let steps = self.translator.finish_iteration();
        if steps.incomplete > 0 {
            log::warn!("it={iteration} {} trajectory steps left open; discarded", steps.incomplete);
            self.pending
                .warnings
                .push(DataWarning::IncompleteSteps { count: steps.incomplete });
        }
        self.pending.steps = steps;

        if self.config.is_active_iteration(iteration) {
            self.write_occupancy_dump(iteration);
        }
        Ok(())
    }

    /// Compute and persist new offsets, then run the comparison reporter.
    /// `Reporting → OffsetUpdating`.
    pub fn iteration_ends(&mut self, iteration: u32) -> ControlResult<IterationSummary> {
        self.require(Phase::Reporting, "end the iteration", iteration)?;
        self.phase = Phase::OffsetUpdating;

        let active = self.config.is_active_iteration(iteration);
        let dir_ready = match self.layout.prepare_iteration(iteration) {
            Ok(_) => true,
            Err(e) => {
                self.io_failure(iteration, "iteration directory", &e);
                false
            }
        };

        // ① flow analysis target
        if self.config.write_flow_analysis {
            let path = (active && dir_ready).then(|| self.layout.iteration_file(iteration, FLOW_ANALYSIS_FILE_NAME));
            self.engine.set_flow_analysis_file(path);
        }

        // ② offsets
        let sim = SimResults::new(&self.aggregator, self.config.counts_scale_factor);
        self.offsets = self.engine.compute_offsets(&sim, &self.counts.occupancy);
        log::info!(
            "it={iteration} {} computed {} offsets (max |offset| {:.4})",
            self.engine.name(),
            self.offsets.len(),
            self.offsets.max_abs()
        );

        // ③ offsets file
        if dir_ready {
            let path = self.layout.iteration_file(iteration, OFFSETS_FILE_NAME);
            match write_offsets(&path, &self.offsets) {
                Ok(()) => self.pending.artifacts.push(path),
                Err(e) => self.io_failure(iteration, OFFSETS_FILE_NAME, &e),
            }
        }

        // ④ comparisons
        let inputs = ReportInputs {
            aggregator: &self.aggregator,
            occupancy:  &self.counts.occupancy,
            board:      self.counts.board.as_ref(),
            alight:     self.counts.alight.as_ref(),
            layout:     &self.layout,
        };
        let outcome = self.reporter.report(iteration, &inputs);
        match &outcome {
            ReportOutcome::Skipped(SkipReason::BinSizeMismatch { bin_size }) => {
                self.pending
                    .warnings
                    .push(DataWarning::BinSizeMismatch { bin_size: *bin_size });
            }
            ReportOutcome::Skipped(reason) => log::debug!("it={iteration} no comparison: {reason:?}"),
            ReportOutcome::Written { files, failures } => {
                self.pending.artifacts.extend(files.iter().cloned());
                self.pending.io_failures.extend(failures.iter().cloned());
            }
        }

        let mut summary = std::mem::take(&mut self.pending);
        summary.iteration = iteration;
        summary.events_counted = self.aggregator.events_counted();
        summary.events_dropped = std::mem::take(&mut self.dropped);
        summary.offsets = self.offsets.len();
        summary.report = Some(outcome);
        self.current = None;

        log::info!(
            "it={iteration} done: {} events, {} artifacts, {} I/O failures, {} warnings",
            summary.events_counted,
            summary.artifacts.len(),
            summary.io_failures.len(),
            summary.warnings.len()
        );
        Ok(summary)
    }

    /// The host simulation has terminated.  `→ Finished`.
    ///
    /// Allowed from any phase; ending mid-iteration discards that
    /// iteration's counts with a warning.
    pub fn finish(&mut self) {
        if let Some(it) = self.current {
            log::warn!("it={it} calibration finished mid-iteration ({:?}); partial counts discarded", self.phase);
        }
        self.current = None;
        self.phase = Phase::Finished;
        log::info!("calibration finished");
    }

    /// Drive `source` through every phase for each iteration in
    /// `iterations`, then [`finish`][Self::finish].
    ///
    /// Returns the per-iteration summaries.  Only phase errors abort.
    pub fn run<S: EventSource>(
        &mut self,
        source: &mut S,
        iterations: RangeInclusive<u32>,
    ) -> ControlResult<Vec<IterationSummary>> {
        let mut summaries = Vec::new();
        for it in iterations {
            self.before_iteration(it)?;
            source.run_iteration(it, &self.offsets, &mut |e: &SimEvent| {
                self.aggregator.on_event(e);
                self.translator.on_event(e);
            });
            self.after_simulation(it)?;
            summaries.push(self.iteration_ends(it)?);
        }
        self.finish();
        Ok(summaries)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Offsets from the latest `iteration_ends` (or the resumed ones).
    pub fn offsets(&self) -> &CostOffsets {
        &self.offsets
    }

    pub fn aggregator(&self) -> &EventAggregator {
        &self.aggregator
    }

    pub fn translator(&self) -> &PlanStepTranslator {
        &self.translator
    }

    /// The scaled view the engine sees.
    pub fn sim_results(&self) -> SimResults<'_> {
        SimResults::new(&self.aggregator, self.config.counts_scale_factor)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The observed occupancy counts the engine is scored against.
    pub fn observed_occupancy(&self) -> &ObservedCounts {
        &self.counts.occupancy
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn write_occupancy_dump(&mut self, iteration: u32) {
        let path = self.layout.iteration_file(iteration, OCCUPANCY_DUMP_FILE_NAME);
        let result = self.layout.prepare_iteration(iteration).map_err(|e| e.to_string()).and_then(|_| {
            let stops: Vec<_> = match &self.config.diagnostic_stops {
                Some(stops) => stops.clone(),
                None => self.registry.iter().map(|(_, spec)| spec.stop).collect(),
            };
            self.aggregator
                .write_selected(&path, &self.counts.occupancy, stops)
                .map_err(|e| e.to_string())
        });
        match result {
            Ok(()) => self.pending.artifacts.push(path),
            Err(e) => self.io_failure(iteration, OCCUPANCY_DUMP_FILE_NAME, &e),
        }
    }

    fn io_failure(&mut self, iteration: u32, what: &str, err: &dyn std::fmt::Display) {
        log::error!("it={iteration} could not write {what}: {err}");
        self.pending.io_failures.push(format!("{what}: {err}"));
    }

    fn require(&self, phase: Phase, action: &'static str, iteration: u32) -> ControlResult<()> {
        if self.phase != phase || self.current != Some(iteration) {
            return Err(self.phase_error(action, iteration));
        }
        Ok(())
    }

    fn phase_error(&self, action: &'static str, iteration: u32) -> ControlError {
        ControlError::Phase { action, iteration, phase: self.phase }
    }
}
