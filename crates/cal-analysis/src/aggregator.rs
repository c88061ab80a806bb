//! The `EventAggregator`: per-stop, per-bin simulated counts.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use cal_core::{BinLayout, CountKind, EntityId, EntityRegistry, SimEvent, StopId, TimeBin};
use cal_counts::ObservedCounts;

use crate::AnalysisResult;

/// Counts board, alight, and occupancy events per calibrated stop and time
/// bin for one iteration.
///
/// Storage is a single flat `Vec<u32>` laid out `[entity][bin][kind]`.  The
/// table is sized once at construction and cleared in bulk by
/// [`reset`][Self::reset]; it never reallocates afterwards.
pub struct EventAggregator {
    registry:       Arc<EntityRegistry>,
    layout:         BinLayout,
    counts:         Vec<u32>,
    iteration:      Option<u32>,
    events_counted: u64,
}

impl EventAggregator {
    /// Create an aggregator with all counters at zero.
    pub fn new(registry: Arc<EntityRegistry>, layout: BinLayout) -> Self {
        let len = registry.len() * layout.count() * CountKind::COUNT;
        Self {
            registry,
            layout,
            counts: vec![0; len],
            iteration: None,
            events_counted: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Zero every counter before `iteration`'s first event.
    ///
    /// Calling it again before any event is delivered has no further effect.
    pub fn reset(&mut self, iteration: u32) {
        self.counts.fill(0);
        self.iteration = Some(iteration);
        self.events_counted = 0;
        log::debug!("it={iteration} aggregator reset ({} counters)", self.counts.len());
    }

    /// Record one event.  Events at uncalibrated stops are ignored.
    #[inline]
    pub fn on_event(&mut self, event: &SimEvent) {
        let Some(entity) = self.registry.lookup(event.stop) else {
            return;
        };
        let bin = self.layout.bin_of(event.time);
        let slot = self.slot(entity, bin, event.kind);
        self.counts[slot] = self.counts[slot].saturating_add(1);
        self.events_counted += 1;
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Count for `(entity, bin, kind)`.  Out-of-range ids or bins read as 0.
    #[inline]
    pub fn query(&self, entity: EntityId, bin: TimeBin, kind: CountKind) -> u32 {
        if entity.index() >= self.registry.len() || bin.index() >= self.layout.count() {
            return 0;
        }
        self.counts[self.slot(entity, bin, kind)]
    }

    /// Like [`query`][Self::query] but keyed by the host's stop id.
    #[inline]
    pub fn query_stop(&self, stop: StopId, bin: TimeBin, kind: CountKind) -> u32 {
        match self.registry.lookup(stop) {
            Some(entity) => self.query(entity, bin, kind),
            None => 0,
        }
    }

    /// Sum over all bins for `(entity, kind)`.
    pub fn total(&self, entity: EntityId, kind: CountKind) -> u64 {
        self.layout
            .bins()
            .map(|bin| self.query(entity, bin, kind) as u64)
            .sum()
    }

    #[inline]
    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    #[inline]
    pub fn layout(&self) -> BinLayout {
        self.layout
    }

    #[inline]
    pub fn bin_count(&self) -> usize {
        self.layout.count()
    }

    /// Iteration of the last `reset`, `None` before the first one.
    #[inline]
    pub fn iteration(&self) -> Option<u32> {
        self.iteration
    }

    /// Events counted since the last reset (calibrated stops only).
    #[inline]
    pub fn events_counted(&self) -> u64 {
        self.events_counted
    }

    // ── Diagnostics ───────────────────────────────────────────────────────

    /// Write a tab-separated dump of simulated counts next to `observed`
    /// occupancy for the calibrated stops in `subset`.
    ///
    /// Rows are ordered by stop id, then bin, so unchanged state always
    /// produces byte-identical output.  Stops outside the calibrated set are
    /// skipped.  An empty `observed` cell means no field value exists, or that
    /// bins are not hourly and so do not line up with the field hours.
    pub fn write_selected<I>(&self, path: &Path, observed: &ObservedCounts, subset: I) -> AnalysisResult<()>
    where
        I: IntoIterator<Item = StopId>,
    {
        let stops: BTreeSet<StopId> = subset.into_iter().collect();
        let hourly = self.layout.size().is_hourly();

        let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
        wtr.write_record(["stop", "name", "bin", "board", "alight", "occupancy", "observed"])?;

        for stop in stops {
            let Some(entity) = self.registry.lookup(stop) else {
                log::debug!("diagnostic dump: skipping uncalibrated {stop}");
                continue;
            };
            let name = &self.registry.spec(entity).name;
            for bin in self.layout.bins() {
                let observed = observed
                    .get(stop, bin)
                    .filter(|_| hourly)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                wtr.write_record([
                    stop.0.to_string(),
                    name.clone(),
                    bin.0.to_string(),
                    self.query(entity, bin, CountKind::Board).to_string(),
                    self.query(entity, bin, CountKind::Alight).to_string(),
                    self.query(entity, bin, CountKind::Occupancy).to_string(),
                    observed,
                ])?;
            }
        }

        wtr.flush()?;
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    #[inline(always)]
    fn slot(&self, entity: EntityId, bin: TimeBin, kind: CountKind) -> usize {
        (entity.index() * self.layout.count() + bin.index()) * CountKind::COUNT + kind.index()
    }
}
