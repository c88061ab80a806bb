//! Fluent builder that validates a configuration and starts the loop.

use std::path::Path;
use std::sync::Arc;

use cal_analysis::{EventAggregator, PlanStepTranslator};
use cal_core::{CalError, CalibrationConfig, EntityRegistry};
use cal_counts::{ObservedCounts, load_counts_csv};
use cal_engine::{CalibrationEngine, CostOffsets, read_offsets};
use cal_output::{ComparisonReporter, OutputLayout};

use crate::controller::Counts;
use crate::{ControlError, ControlResult, IterationController};

/// Fluent builder for [`IterationController<E>`].  This is the `Idle` phase.
///
/// # Required inputs
///
/// - [`CalibrationConfig`]: stops, bins, gates, file paths
/// - `E: CalibrationEngine`: the optimizer
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                                  |
/// |--------------------------|------------------------------------------|
/// | `.occupancy_counts(c)`   | Loaded from `config.occupancy_counts`    |
/// | `.board_counts(c)`       | Loaded from `config.board_counts`, if set |
/// | `.alight_counts(c)`      | Loaded from `config.alight_counts`, if set |
///
/// Occupancy counts are required one way or the other.
///
/// # Example
///
/// ```rust,ignore
/// let mut ctl = CalibrationBuilder::new(config, NoopEngine)
///     .occupancy_counts(observed)
///     .startup()?;
/// ```
pub struct CalibrationBuilder<E: CalibrationEngine> {
    config:    CalibrationConfig,
    engine:    E,
    occupancy: Option<ObservedCounts>,
    board:     Option<ObservedCounts>,
    alight:    Option<ObservedCounts>,
}

impl<E: CalibrationEngine> CalibrationBuilder<E> {
    pub fn new(config: CalibrationConfig, engine: E) -> Self {
        Self {
            config,
            engine,
            occupancy: None,
            board:     None,
            alight:    None,
        }
    }

    /// Supply observed occupancy counts instead of reading
    /// `config.occupancy_counts`.
    pub fn occupancy_counts(mut self, counts: ObservedCounts) -> Self {
        self.occupancy = Some(counts);
        self
    }

    /// Supply observed boarding counts instead of reading
    /// `config.board_counts`.
    pub fn board_counts(mut self, counts: ObservedCounts) -> Self {
        self.board = Some(counts);
        self
    }

    /// Supply observed alighting counts instead of reading
    /// `config.alight_counts`.  Without them no comparison is ever written.
    pub fn alight_counts(mut self, counts: ObservedCounts) -> Self {
        self.alight = Some(counts);
        self
    }

    /// Validate, load, and wire everything.  `Idle → Started`.
    ///
    /// Every error is fatal; nothing is written to `output_dir` here.
    pub fn startup(mut self) -> ControlResult<IterationController<E>> {
        let config = self.config;
        config.validate()?;
        let layout = config.bin_layout()?;
        let registry = Arc::new(EntityRegistry::new(config.calibrated_stops.clone())?);

        // ── Observed counts ───────────────────────────────────────────────
        let occupancy = match self.occupancy {
            Some(c) => c,
            None => match &config.occupancy_counts {
                Some(path) => load(path)?,
                None => {
                    return Err(CalError::Config(
                        "observed occupancy counts are required (set occupancy_counts)".into(),
                    )
                    .into());
                }
            },
        };
        let board = resolve(self.board, config.board_counts.as_deref())?;
        let alight = resolve(self.alight, config.alight_counts.as_deref())?;

        let uncovered = registry
            .iter()
            .filter(|(_, spec)| occupancy.series(spec.stop).is_empty())
            .count();
        if uncovered > 0 {
            log::warn!("{uncovered} of {} calibrated stops have no observed occupancy", registry.len());
        }
        if alight.is_none() {
            log::info!("no alighting counts configured; counts comparisons are disabled");
        }

        // ── Resume ────────────────────────────────────────────────────────
        let mut offsets = CostOffsets::new();
        if let Some(path) = &config.resume_offsets {
            match read_offsets(path) {
                Ok(Some(previous)) => {
                    log::info!("resuming from {} offsets in {}", previous.len(), path.display());
                    self.engine.resume_from(&previous);
                    offsets = previous;
                }
                Ok(None) => log::info!("no offsets at {}; starting fresh", path.display()),
                Err(source) => {
                    return Err(ControlError::Offsets { path: path.clone(), source });
                }
            }
        }

        log::info!(
            "calibration started: {} stops, {} bins of {}, engine {}",
            registry.len(),
            layout.count(),
            layout.size(),
            self.engine.name()
        );

        Ok(IterationController::new(
            EventAggregator::new(Arc::clone(&registry), layout),
            PlanStepTranslator::new(Arc::clone(&registry)),
            ComparisonReporter::from_config(&config),
            OutputLayout::new(config.output_dir.clone()),
            Counts { occupancy, board, alight },
            self.engine,
            offsets,
            config,
            registry,
        ))
    }
}

fn load(path: &Path) -> ControlResult<ObservedCounts> {
    load_counts_csv(path).map_err(|source| ControlError::Counts {
        path: path.to_path_buf(),
        source,
    })
}

fn resolve(supplied: Option<ObservedCounts>, path: Option<&Path>) -> ControlResult<Option<ObservedCounts>> {
    match (supplied, path) {
        (Some(c), _) => Ok(Some(c)),
        (None, Some(path)) => load(path).map(Some),
        (None, None) => Ok(None),
    }
}
