//! `SimResults`: the engine's read-only view of simulated counts.

use cal_core::{BinSize, CountKind, EntityId, EntityRegistry, StopId, TimeBin};

use crate::EventAggregator;

/// Scaled, read-only view over an [`EventAggregator`].
///
/// Holds no data of its own: every call reads the aggregator's current
/// counters, so a `SimResults` can never serve a previous iteration's
/// values.  The borrow also keeps the aggregator from being reset while a
/// view is alive.
#[derive(Clone, Copy)]
pub struct SimResults<'a> {
    aggregator:   &'a EventAggregator,
    scale_factor: f64,
}

impl<'a> SimResults<'a> {
    pub fn new(aggregator: &'a EventAggregator, scale_factor: f64) -> Self {
        Self { aggregator, scale_factor }
    }

    /// Simulated occupancy for `(entity, bin)`, scaled to full population.
    #[inline]
    pub fn volume(&self, entity: EntityId, bin: TimeBin) -> f64 {
        self.volume_of(entity, bin, CountKind::Occupancy)
    }

    /// Scaled simulated count of any kind.
    #[inline]
    pub fn volume_of(&self, entity: EntityId, bin: TimeBin, kind: CountKind) -> f64 {
        self.aggregator.query(entity, bin, kind) as f64 * self.scale_factor
    }

    /// Stop-keyed variant of [`volume`][Self::volume].  Uncalibrated stops
    /// read as 0.
    #[inline]
    pub fn volume_at(&self, stop: StopId, bin: TimeBin) -> f64 {
        self.aggregator.query_stop(stop, bin, CountKind::Occupancy) as f64 * self.scale_factor
    }

    /// Scaled simulated occupancy over field hour `hour`, for comparison
    /// with the hourly observed counts whatever the bin size.
    pub fn hourly_volume(&self, entity: EntityId, hour: TimeBin) -> f64 {
        self.aggregator
            .layout()
            .hour_overlaps(hour)
            .map(|(bin, share)| self.volume(entity, bin) * share)
            .sum()
    }

    pub fn entities(&self) -> &'a EntityRegistry {
        self.aggregator.registry()
    }

    pub fn bins(&self) -> impl Iterator<Item = TimeBin> + use<> {
        self.aggregator.layout().bins()
    }

    #[inline]
    pub fn bin_count(&self) -> usize {
        self.aggregator.bin_count()
    }

    #[inline]
    pub fn bin_size(&self) -> BinSize {
        self.aggregator.layout().size()
    }

    #[inline]
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }
}
