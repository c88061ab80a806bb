//! Simulated-vs-observed comparison records.

use cal_analysis::EventAggregator;
use cal_core::{BinSize, CountKind, DistanceFilter, EntityId, EntityRegistry, StopId, TimeBin};
use cal_counts::ObservedCounts;

/// One `(stop, bin, kind)` cell of a comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonRecord {
    pub entity:     EntityId,
    pub stop:       StopId,
    pub bin:        TimeBin,
    pub kind:       CountKind,
    /// Simulated count, scaled to full population.
    pub simulated:  f64,
    /// `None` when the field data has no value for this cell.
    pub observed:   Option<f64>,
    /// Distance to the filter center; `None` when no filter is configured.
    pub distance_m: Option<f64>,
}

impl ComparisonRecord {
    /// `simulated / observed`, when an observation exists and is non-zero.
    pub fn ratio(&self) -> Option<f64> {
        match self.observed {
            Some(obs) if obs > 0.0 => Some(self.simulated / obs),
            _ => None,
        }
    }
}

/// Build records for every calibrated stop and bin of one series.
///
/// Records are ordered by entity, then bin.  With a `filter`, stops farther
/// than `radius_m` from the center stop are left out.  An unknown center
/// disables the filter with a warning.
pub fn build_comparison(
    kind:       CountKind,
    aggregator: &EventAggregator,
    observed:   &ObservedCounts,
    scale:      f64,
    filter:     Option<&DistanceFilter>,
) -> Vec<ComparisonRecord> {
    let registry = aggregator.registry();

    let center = filter.and_then(|f| match registry.lookup(f.center) {
        Some(entity) => Some((registry.spec(entity).coord, f.radius_m)),
        None => {
            log::warn!("distance filter center {} is not calibrated; filter ignored", f.center);
            None
        }
    });

    let mut records = Vec::with_capacity(registry.len() * aggregator.bin_count());
    for (entity, spec) in registry.iter() {
        let distance_m = match center {
            Some((coord, radius)) => {
                if !spec.coord.within_radius(coord, radius) {
                    continue;
                }
                Some(spec.coord.distance_m(coord))
            }
            None => None,
        };

        for bin in aggregator.layout().bins() {
            records.push(ComparisonRecord {
                entity,
                stop: spec.stop,
                bin,
                kind,
                simulated: aggregator.query(entity, bin, kind) as f64 * scale,
                observed: observed.get(spec.stop, bin),
                distance_m,
            });
        }
    }
    records
}

/// The three series of one comparison run, plus what writers need to label
/// them.
pub struct ComparisonSet<'a> {
    pub registry:  &'a EntityRegistry,
    pub bin_size:  BinSize,
    pub board:     Vec<ComparisonRecord>,
    pub alight:    Vec<ComparisonRecord>,
    pub occupancy: Vec<ComparisonRecord>,
}

impl ComparisonSet<'_> {
    pub fn series(&self, kind: CountKind) -> &[ComparisonRecord] {
        match kind {
            CountKind::Board     => &self.board,
            CountKind::Alight    => &self.alight,
            CountKind::Occupancy => &self.occupancy,
        }
    }

    /// Number of distinct stops that survived the filter.
    pub fn stop_count(&self) -> usize {
        let mut stops: Vec<EntityId> = self.occupancy.iter().map(|r| r.entity).collect();
        stops.dedup();
        stops.len()
    }
}
