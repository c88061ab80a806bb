//! Tests for cal-control.

use std::path::Path;

use cal_core::{
    AgentId, CalError, CalibrationConfig, CountKind, EntityId, EntitySpec, GeoPoint, SimEvent, StopId, TimeBin,
};
use cal_counts::ObservedCounts;
use cal_engine::{CalibrationEngine, CostOffsets, NoopEngine, ProportionalEngine, write_offsets};
use cal_output::{ReportOutcome, SkipReason};

use crate::controller::{FLOW_ANALYSIS_FILE_NAME, OCCUPANCY_DUMP_FILE_NAME, OFFSETS_FILE_NAME};
use crate::{CalibrationBuilder, ControlError, DataWarning, EventSource, IterationController, Phase};

// ── Helpers ───────────────────────────────────────────────────────────────────

const A: StopId = StopId(1);
const B: StopId = StopId(2);
const OUTSIDE: StopId = StopId(99);

fn config(output_dir: &Path) -> CalibrationConfig {
    CalibrationConfig {
        calibrated_stops: vec![
            EntitySpec::new(A, "A", GeoPoint::new(47.00, 8.0)),
            EntitySpec::new(B, "B", GeoPoint::new(47.01, 8.0)),
        ],
        counts_interval: 1,
        output_formats: vec!["txt".into()],
        output_dir: output_dir.to_path_buf(),
        ..CalibrationConfig::default()
    }
}

fn counts(rows: &[(StopId, u32, f64)]) -> ObservedCounts {
    let mut obs = ObservedCounts::new();
    for &(stop, bin, v) in rows {
        obs.insert(stop, TimeBin(bin), v);
    }
    obs
}

fn start<E: CalibrationEngine>(config: CalibrationConfig, engine: E) -> IterationController<E> {
    CalibrationBuilder::new(config, engine)
        .occupancy_counts(counts(&[(A, 0, 10.0), (B, 0, 20.0)]))
        .board_counts(counts(&[(A, 0, 10.0), (B, 0, 20.0)]))
        .alight_counts(counts(&[(A, 0, 5.0)]))
        .startup()
        .unwrap()
}

/// Replays the same events every iteration and remembers the offsets it saw.
struct Replay {
    events: Vec<SimEvent>,
    seen:   Vec<CostOffsets>,
}

impl Replay {
    fn new(events: Vec<SimEvent>) -> Self {
        Self { events, seen: Vec::new() }
    }
}

impl EventSource for Replay {
    fn run_iteration(&mut self, _iteration: u32, offsets: &CostOffsets, sink: &mut dyn FnMut(&SimEvent)) {
        self.seen.push(offsets.clone());
        for e in &self.events {
            sink(e);
        }
    }
}

/// 12 boards at A in the first hour, 8 in the second; nothing at B.
fn ab_events() -> Vec<SimEvent> {
    let first = (0..12).map(|i| SimEvent::board(100.0 + i as f64, AgentId(i), A));
    let second = (12..20).map(|i| SimEvent::board(3600.0 + i as f64, AgentId(i), A));
    first.chain(second).collect()
}

fn txt_row<'a>(text: &'a str, stop: &str, hour: &str) -> Vec<&'a str> {
    text.lines()
        .map(|l| l.split('\t').collect::<Vec<_>>())
        .find(|f| f[0] == stop && f[2] == hour)
        .unwrap()
}

// ── End to end ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loop_tests {
    use super::*;

    #[test]
    fn boarding_comparison_matches_hand_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = start(config(dir.path()), NoopEngine);
        let mut source = Replay::new(ab_events());

        let summaries = ctl.run(&mut source, 0..=0).unwrap();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].is_clean(), "{:?}", summaries[0].io_failures);
        assert_eq!(ctl.phase(), Phase::Finished);

        let a = EntityId(0);
        assert_eq!(ctl.aggregator().query(a, TimeBin(0), CountKind::Board), 12);
        assert_eq!(ctl.aggregator().query(a, TimeBin(1), CountKind::Board), 8);

        let file = dir.path().join("ITERS/it.0/0.countsCompareBoarding.txt");
        let text = std::fs::read_to_string(file).unwrap();
        let a_row = txt_row(&text, "1", "1");
        assert_eq!((a_row[3], a_row[4]), ("12.0000", "10.0000"));
        let b_row = txt_row(&text, "2", "1");
        assert_eq!((b_row[3], b_row[4]), ("0.0000", "20.0000"));
    }

    #[test]
    fn every_boundary_artifact_is_listed() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = start(config(dir.path()), NoopEngine);
        let summaries = ctl.run(&mut Replay::new(ab_events()), 0..=0).unwrap();

        let names: Vec<String> = summaries[0]
            .artifacts
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names.contains(&format!("0.{OFFSETS_FILE_NAME}")));
        assert!(names.contains(&format!("0.{OCCUPANCY_DUMP_FILE_NAME}")));
        assert!(names.contains(&"0.countsCompareOccupancy.txt".to_string()));
        for path in &summaries[0].artifacts {
            assert!(path.exists(), "{}", path.display());
        }
    }

    #[test]
    fn offsets_feed_the_next_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = start(config(dir.path()), ProportionalEngine::default());
        let mut source = Replay::new(Vec::new());

        ctl.run(&mut source, 0..=1).unwrap();

        // No simulated occupancy: both stops are under-served.
        assert!(source.seen[0].is_empty());
        assert!(source.seen[1].get(A).unwrap() > 0.0);
        assert!(source.seen[1].get(B).unwrap() > 0.0);
        assert_eq!(ctl.offsets(), &source.seen[1]);
    }

    #[test]
    fn reset_zeroes_previous_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = start(config(dir.path()), NoopEngine);

        ctl.before_iteration(0).unwrap();
        for e in ab_events() {
            ctl.handle_event(&e);
        }
        ctl.after_simulation(0).unwrap();
        ctl.iteration_ends(0).unwrap();

        ctl.before_iteration(1).unwrap();
        assert_eq!(ctl.aggregator().events_counted(), 0);
        for bin in ctl.sim_results().bins() {
            assert_eq!(ctl.aggregator().query(EntityId(0), bin, CountKind::Board), 0);
        }
        assert_eq!(ctl.translator().open_steps(), 0);
    }

    #[test]
    fn uncalibrated_events_change_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = start(config(dir.path()), NoopEngine);
        let events = vec![SimEvent::board(10.0, AgentId(0), OUTSIDE), SimEvent::alight(20.0, AgentId(0), OUTSIDE)];

        let summary = ctl.run(&mut Replay::new(events), 0..=0).unwrap().remove(0);
        assert_eq!(summary.events_counted, 0);
        assert_eq!(summary.steps.incomplete, 0);
    }

    #[test]
    fn closed_steps_are_tracked() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = start(config(dir.path()), NoopEngine);
        let events = vec![SimEvent::board(10.0, AgentId(3), A), SimEvent::alight(70.0, AgentId(3), A)];

        let summary = ctl.run(&mut Replay::new(events), 0..=0).unwrap().remove(0);
        assert_eq!(summary.steps.closed, 1);
        assert!(summary.warnings.is_empty());
        assert_eq!(ctl.translator().steps(EntityId(0)).len(), 1);
    }

    #[test]
    fn incomplete_step_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = start(config(dir.path()), NoopEngine);
        let events = vec![SimEvent::board(10.0, AgentId(3), A)];

        let summary = ctl.run(&mut Replay::new(events), 0..=0).unwrap().remove(0);
        assert_eq!(summary.steps.closed, 0);
        assert_eq!(summary.steps.incomplete, 1);
        assert_eq!(summary.warnings, vec![DataWarning::IncompleteSteps { count: 1 }]);
    }
}

// ── Phase sequencing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod phase_tests {
    use super::*;

    fn is_phase_error<T: std::fmt::Debug>(r: Result<T, ControlError>) -> bool {
        matches!(r, Err(ControlError::Phase { .. }))
    }

    #[test]
    fn out_of_order_calls_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = start(config(dir.path()), NoopEngine);
        assert_eq!(ctl.phase(), Phase::Started);

        assert!(is_phase_error(ctl.after_simulation(0)));
        assert!(is_phase_error(ctl.iteration_ends(0)));
        assert_eq!(ctl.phase(), Phase::Started);

        ctl.before_iteration(0).unwrap();
        assert!(is_phase_error(ctl.before_iteration(1)));
        assert!(is_phase_error(ctl.iteration_ends(0)));
        assert!(is_phase_error(ctl.after_simulation(1)));
        assert_eq!(ctl.phase(), Phase::Accumulating);

        ctl.after_simulation(0).unwrap();
        assert_eq!(ctl.phase(), Phase::Reporting);
        assert!(is_phase_error(ctl.before_iteration(1)));
        ctl.iteration_ends(0).unwrap();
        assert_eq!(ctl.phase(), Phase::OffsetUpdating);

        ctl.finish();
        assert!(is_phase_error(ctl.before_iteration(1)));
    }

    #[test]
    fn events_outside_accumulation_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = start(config(dir.path()), NoopEngine);

        ctl.handle_event(&SimEvent::board(10.0, AgentId(0), A));
        ctl.before_iteration(0).unwrap();
        ctl.handle_event(&SimEvent::board(10.0, AgentId(1), A));
        ctl.after_simulation(0).unwrap();
        ctl.handle_event(&SimEvent::board(10.0, AgentId(2), A));

        let summary = ctl.iteration_ends(0).unwrap();
        assert_eq!(summary.events_counted, 1);
        assert_eq!(summary.events_dropped, 2);
        assert_eq!(ctl.aggregator().query(EntityId(0), TimeBin(0), CountKind::Board), 1);
    }
}

// ── Gates and boundary I/O ────────────────────────────────────────────────────

#[cfg(test)]
mod report_tests {
    use super::*;

    fn comparison_files(dir: &Path, iteration: u32) -> usize {
        let it_dir = dir.join(format!("ITERS/it.{iteration}"));
        if !it_dir.exists() {
            return 0;
        }
        std::fs::read_dir(it_dir)
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().contains("countsCompare"))
            .count()
    }

    #[test]
    fn inactive_iteration_writes_offsets_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.counts_interval = 2;
        let mut ctl = start(cfg, NoopEngine);

        let summaries = ctl.run(&mut Replay::new(ab_events()), 0..=1).unwrap();
        assert!(matches!(summaries[0].report, Some(ReportOutcome::Written { .. })));
        assert_eq!(summaries[1].report, Some(ReportOutcome::Skipped(SkipReason::NotActive)));
        assert_eq!(comparison_files(dir.path(), 1), 0);
        assert!(!dir.path().join(format!("ITERS/it.1/1.{OCCUPANCY_DUMP_FILE_NAME}")).exists());
        assert!(dir.path().join(format!("ITERS/it.1/1.{OFFSETS_FILE_NAME}")).exists());
    }

    #[test]
    fn no_alight_counts_means_no_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = CalibrationBuilder::new(config(dir.path()), NoopEngine)
            .occupancy_counts(counts(&[(A, 0, 10.0)]))
            .startup()
            .unwrap();

        let summary = ctl.run(&mut Replay::new(ab_events()), 0..=0).unwrap().remove(0);
        assert_eq!(summary.report, Some(ReportOutcome::Skipped(SkipReason::NoReferenceCounts)));
        assert_eq!(comparison_files(dir.path(), 0), 0);
    }

    #[test]
    fn quarter_hour_bins_warn_once_and_skip_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.time_bin_secs = 900;
        let mut ctl = start(cfg, NoopEngine);

        let summary = ctl.run(&mut Replay::new(ab_events()), 0..=0).unwrap().remove(0);
        let mismatches = summary
            .warnings
            .iter()
            .filter(|w| matches!(w, DataWarning::BinSizeMismatch { .. }))
            .count();
        assert_eq!(mismatches, 1);
        assert_eq!(comparison_files(dir.path(), 0), 0);
        assert!(dir.path().join(format!("ITERS/it.0/0.{OFFSETS_FILE_NAME}")).exists());
    }

    #[test]
    fn unwritable_output_does_not_stop_the_loop() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut ctl = start(config(file.path()), ProportionalEngine::default());
        let mut source = Replay::new(ab_events());

        let summaries = ctl.run(&mut source, 0..=2).unwrap();
        assert_eq!(summaries.len(), 3);
        for s in &summaries {
            assert!(!s.is_clean());
            assert!(s.artifacts.is_empty());
            assert_eq!(s.offsets, 2);
        }
        assert_eq!(ctl.phase(), Phase::Finished);
    }

    #[test]
    fn flow_analysis_only_on_active_iterations() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.counts_interval = 2;
        cfg.write_flow_analysis = true;
        let mut ctl = start(cfg, ProportionalEngine::default());

        ctl.run(&mut Replay::new(ab_events()), 0..=1).unwrap();
        assert!(dir.path().join(format!("ITERS/it.0/0.{FLOW_ANALYSIS_FILE_NAME}")).exists());
        assert!(!dir.path().join(format!("ITERS/it.1/1.{FLOW_ANALYSIS_FILE_NAME}")).exists());
    }

    #[test]
    fn diagnostic_stops_limit_the_dump() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.diagnostic_stops = Some(vec![B, OUTSIDE]);
        let mut ctl = start(cfg, NoopEngine);

        ctl.run(&mut Replay::new(ab_events()), 0..=0).unwrap();
        let dump = std::fs::read_to_string(dir.path().join(format!("ITERS/it.0/0.{OCCUPANCY_DUMP_FILE_NAME}"))).unwrap();
        let stops: Vec<&str> = dump.lines().skip(1).map(|l| l.split('\t').next().unwrap()).collect();
        assert!(!stops.is_empty());
        assert!(stops.iter().all(|&s| s == "2"));
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod startup_tests {
    use super::*;

    #[test]
    fn occupancy_counts_are_required() {
        let dir = tempfile::tempdir().unwrap();
        let result = CalibrationBuilder::new(config(dir.path()), NoopEngine).startup();
        assert!(matches!(result, Err(ControlError::Config(CalError::Config(_)))));
    }

    #[test]
    fn invalid_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.counts_interval = 0;
        let result = CalibrationBuilder::new(cfg, NoopEngine)
            .occupancy_counts(ObservedCounts::new())
            .startup();
        assert!(matches!(result, Err(ControlError::Config(_))));
    }

    #[test]
    fn counts_are_loaded_from_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        let occ = dir.path().join("occupancy.csv");
        std::fs::write(&occ, "stop_id,hour,count\n1,1,10\n2,1,20\n").unwrap();
        let mut cfg = config(&dir.path().join("out"));
        cfg.occupancy_counts = Some(occ);
        cfg.alight_counts = Some(dir.path().join("does-not-exist.csv"));

        let result = CalibrationBuilder::new(cfg.clone(), NoopEngine).startup();
        assert!(matches!(result, Err(ControlError::Counts { .. })));

        cfg.alight_counts = None;
        let ctl = CalibrationBuilder::new(cfg, NoopEngine).startup().unwrap();
        assert_eq!(ctl.registry().len(), 2);
        assert_eq!(ctl.observed_occupancy().len(), 2);
        assert_eq!(ctl.observed_occupancy().get(B, TimeBin(0)), Some(20.0));
    }

    #[test]
    fn missing_resume_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.resume_offsets = Some(dir.path().join("none.csv"));
        let ctl = start(cfg, NoopEngine);
        assert!(ctl.offsets().is_empty());
    }

    #[test]
    fn resume_file_seeds_the_first_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let saved: CostOffsets = [(A, 1.5), (B, -0.5)].into_iter().collect();
        let path = dir.path().join("offsets.csv");
        write_offsets(&path, &saved).unwrap();

        let mut cfg = config(dir.path());
        cfg.resume_offsets = Some(path);
        let mut ctl = start(cfg, NoopEngine);
        assert_eq!(ctl.offsets(), &saved);

        let mut source = Replay::new(Vec::new());
        ctl.run(&mut source, 0..=0).unwrap();
        assert_eq!(source.seen[0], saved);
    }

    #[test]
    fn corrupt_resume_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offsets.csv");
        std::fs::write(&path, "stop_id,offset\n1,abc\n").unwrap();
        let mut cfg = config(dir.path());
        cfg.resume_offsets = Some(path);

        let result = CalibrationBuilder::new(cfg, NoopEngine)
            .occupancy_counts(ObservedCounts::new())
            .startup();
        assert!(matches!(result, Err(ControlError::Offsets { .. })));
    }
}
