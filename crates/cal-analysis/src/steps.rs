//! The `PlanStepTranslator`: per-agent stop visits rebuilt from events.
//!
//! A board event at a calibrated stop opens a step for `(agent, stop)`; the
//! next alight event by the same agent at the same stop closes it.  Closed
//! steps are what the calibration engine scores against the offsets it
//! handed out.  Steps still open when the iteration ends are dropped.

use std::sync::Arc;

use cal_core::{AgentId, CountKind, EntityId, EntityRegistry, SimEvent, StopId};

#[cfg(feature = "fx-hash")]
type StepMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(not(feature = "fx-hash"))]
type StepMap<K, V> = std::collections::HashMap<K, V>;

/// One completed visit of an agent to a calibrated stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryStep {
    pub agent:      AgentId,
    pub entity:     EntityId,
    pub stop:       StopId,
    pub entry_time: f64,
    pub exit_time:  f64,
}

/// Bookkeeping returned by [`PlanStepTranslator::finish_iteration`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepSummary {
    pub closed:            usize,
    /// Open steps discarded at iteration end, plus steps superseded by a
    /// second board before they were closed.
    pub incomplete:        usize,
    /// Alight events with no open step to close.
    pub unmatched_alights: usize,
}

/// Builds per-stop and per-agent step lists for one iteration.
pub struct PlanStepTranslator {
    registry:  Arc<EntityRegistry>,
    /// Entry time of each open step.
    open:      StepMap<(AgentId, EntityId), f64>,
    by_entity: Vec<Vec<TrajectoryStep>>,
    by_agent:  StepMap<AgentId, Vec<TrajectoryStep>>,
    iteration: Option<u32>,
    closed:    usize,
    replaced:  usize,
    unmatched: usize,
}

impl PlanStepTranslator {
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        let by_entity = vec![Vec::new(); registry.len()];
        Self {
            registry,
            open:      StepMap::default(),
            by_entity,
            by_agent:  StepMap::default(),
            iteration: None,
            closed:    0,
            replaced:  0,
            unmatched: 0,
        }
    }

    /// Drop all steps from the previous iteration.  Per-stop buffers keep
    /// their capacity.
    pub fn reset(&mut self, iteration: u32) {
        self.open.clear();
        for steps in &mut self.by_entity {
            steps.clear();
        }
        self.by_agent.clear();
        self.iteration = Some(iteration);
        self.closed = 0;
        self.replaced = 0;
        self.unmatched = 0;
    }

    /// Feed one event.  Uncalibrated stops and occupancy events are ignored.
    #[inline]
    pub fn on_event(&mut self, event: &SimEvent) {
        let Some(entity) = self.registry.lookup(event.stop) else {
            return;
        };
        match event.kind {
            CountKind::Board => {
                if self.open.insert((event.agent, entity), event.time).is_some() {
                    self.replaced += 1;
                }
            }
            CountKind::Alight => match self.open.remove(&(event.agent, entity)) {
                Some(entry_time) => self.close(event.agent, entity, event.stop, entry_time, event.time),
                None => self.unmatched += 1,
            },
            CountKind::Occupancy => {}
        }
    }

    /// Discard steps that were never closed and return the iteration's tally.
    ///
    /// Open steps are expected when the simulation ends early or data has
    /// gaps, so they are logged, not raised.
    pub fn finish_iteration(&mut self) -> StepSummary {
        let it = self.iteration.unwrap_or_default();
        let dangling = self.open.len();
        if dangling > 0 {
            log::info!("it={it} discarding {dangling} incomplete trajectory steps");
            for &(agent, entity) in self.open.keys() {
                log::debug!(
                    "it={it} {agent} boarded at {} without alighting",
                    self.registry.stop(entity)
                );
            }
            self.open.clear();
        }
        if self.unmatched > 0 {
            log::debug!("it={it} {} alight events had no matching board", self.unmatched);
        }

        StepSummary {
            closed:            self.closed,
            incomplete:        dangling + self.replaced,
            unmatched_alights: self.unmatched,
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Closed steps at `entity`, in the order they were closed.
    pub fn steps(&self, entity: EntityId) -> &[TrajectoryStep] {
        self.by_entity
            .get(entity.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Closed steps of `agent` across all stops, in the order they were closed.
    pub fn agent_plan(&self, agent: AgentId) -> &[TrajectoryStep] {
        self.by_agent
            .get(&agent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of steps currently open.
    #[inline]
    pub fn open_steps(&self) -> usize {
        self.open.len()
    }

    #[inline]
    pub fn closed_steps(&self) -> usize {
        self.closed
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn close(&mut self, agent: AgentId, entity: EntityId, stop: StopId, entry_time: f64, exit_time: f64) {
        let step = TrajectoryStep { agent, entity, stop, entry_time, exit_time };
        self.by_entity[entity.index()].push(step);
        self.by_agent.entry(agent).or_default().push(step);
        self.closed += 1;
    }
}
