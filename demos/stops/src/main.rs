//! stops: smallest end-to-end run of the rust_cal calibration loop.
//!
//! A seeded synthetic population rides a five-stop network.  Each rider
//! picks a stop with probability proportional to
//! `base_weight · exp(offset)`, so the offsets written at the end of one
//! iteration steer the next.  After a handful of iterations simulated
//! occupancy should track the field counts.
//!
//! ```text
//! cargo run -p stops                 # built-in network and counts
//! cargo run -p stops -- config.json  # CalibrationConfig from JSON
//! RUST_LOG=debug cargo run -p stops  # per-iteration detail
//! ```

mod network;

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::Rng;

use cal_analysis::SimResults;
use cal_control::{CalibrationBuilder, EventSource, IterationController};
use cal_core::{AgentId, CalibrationConfig, SimEvent, StopId, TimeBin};
use cal_counts::load_counts_reader;
use cal_engine::{CalibrationEngine, CostOffsets, ProportionalEngine};

// ── Constants ─────────────────────────────────────────────────────────────────

const RIDERS:       u32 = 1_200;
const SEED:         u64 = 42;
const ITERATIONS:   u32 = 20;
const SCALE_FACTOR: f64 = 10.0; // 10 % sample
const PEAK_START:   f64 = 6.5 * 3600.0;
const PEAK_SPAN:    f64 = 3.0 * 3600.0;
const MAX_RIDE:     f64 = 1_800.0;

// ── Synthetic mobility simulation ─────────────────────────────────────────────

/// Seeded toy simulation: one board, one occupancy sample, and one alight per
/// rider per iteration.
struct SyntheticTransit {
    weights: Vec<(StopId, f64)>,
}

impl EventSource for SyntheticTransit {
    fn run_iteration(&mut self, iteration: u32, offsets: &CostOffsets, sink: &mut dyn FnMut(&SimEvent)) {
        let mut rng = SmallRng::seed_from_u64(SEED ^ u64::from(iteration));
        let stops: Vec<StopId> = self.weights.iter().map(|&(s, _)| s).collect();
        let weights = self
            .weights
            .iter()
            .map(|&(stop, w)| w * offsets.get(stop).unwrap_or(0.0).clamp(-5.0, 5.0).exp());
        let Ok(choice) = WeightedIndex::new(weights) else {
            log::error!("it={iteration} degenerate stop weights; no riders this iteration");
            return;
        };

        for rider in 0..RIDERS {
            let agent = AgentId(rider);
            let stop = stops[choice.sample(&mut rng)];
            let board = PEAK_START + rng.gen_range(0.0..PEAK_SPAN);
            sink(&SimEvent::board(board, agent, stop));
            sink(&SimEvent::occupancy(board, agent, stop));
            sink(&SimEvent::alight(board + rng.gen_range(60.0..MAX_RIDE), agent, stop));
        }
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn default_config() -> CalibrationConfig {
    CalibrationConfig {
        calibrated_stops:    network::calibrated_stops(),
        counts_interval:     5,
        counts_scale_factor: SCALE_FACTOR,
        output_formats:      vec!["all".into()],
        write_flow_analysis: true,
        output_dir:          PathBuf::from("output/stops"),
        ..CalibrationConfig::default()
    }
}

fn start(args: &[String]) -> Result<IterationController<ProportionalEngine>> {
    let engine = ProportionalEngine::new(0.05, 10.0);

    if let Some(path) = args.get(1) {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        let config: CalibrationConfig =
            serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
        return CalibrationBuilder::new(config, engine)
            .startup()
            .context("starting calibration");
    }

    CalibrationBuilder::new(default_config(), engine)
        .occupancy_counts(load_counts_reader(Cursor::new(network::OCCUPANCY_CSV))?)
        .board_counts(load_counts_reader(Cursor::new(network::BOARD_CSV))?)
        .alight_counts(load_counts_reader(Cursor::new(network::ALIGHT_CSV))?)
        .startup()
        .context("starting calibration")
}

/// Σ |simulated − observed| over the field hours with an observation, against
/// the occupancy counts the controller loaded.
fn absolute_error<E: CalibrationEngine>(ctl: &IterationController<E>) -> f64 {
    let sim: SimResults<'_> = ctl.sim_results();
    let observed = ctl.observed_occupancy();
    sim.entities()
        .iter()
        .flat_map(|(entity, spec)| {
            observed
                .series(spec.stop)
                .into_iter()
                .map(move |(hour, obs): (TimeBin, f64)| (sim.hourly_volume(entity, hour) - obs).abs())
        })
        .sum()
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let mut ctl = start(&args)?;
    let mut sim = SyntheticTransit { weights: network::base_weights() };

    println!("=== stops: rust_cal calibration loop ===");
    println!("Riders: {RIDERS}  |  Iterations: {ITERATIONS}  |  Seed: {SEED}");
    println!();
    println!("{:<6} {:>10} {:>10} {:>8} {:>8}", "it", "events", "abs_err", "files", "failed");
    println!("{}", "-".repeat(46));

    let t0 = Instant::now();
    for it in 0..ITERATIONS {
        ctl.before_iteration(it)?;
        let offsets = ctl.offsets().clone();
        sim.run_iteration(it, &offsets, &mut |e: &SimEvent| ctl.handle_event(e));
        ctl.after_simulation(it)?;
        let error = absolute_error(&ctl);
        let summary = ctl.iteration_ends(it)?;
        println!(
            "{:<6} {:>10} {:>10.1} {:>8} {:>8}",
            it,
            summary.events_counted,
            error,
            summary.artifacts.len(),
            summary.io_failures.len()
        );
    }
    ctl.finish();

    println!();
    println!("Calibration complete in {:.3} s", t0.elapsed().as_secs_f64());
    println!("{:<8} {:>10}", "Stop", "Offset");
    println!("{}", "-".repeat(20));
    for (stop, offset) in ctl.offsets().iter() {
        println!("{:<8} {:>10.4}", stop.0, offset);
    }

    Ok(())
}
