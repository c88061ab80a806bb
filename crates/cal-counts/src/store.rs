//! The `ObservedCounts` store.

use std::collections::{BTreeMap, HashMap};

use cal_core::{StopId, TimeBin};

/// Reference counts keyed by `(stop, bin)`.
///
/// A missing key is a normal outcome: a calibrated stop may have no field
/// data, and field data may cover stops outside the calibrated set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservedCounts {
    values: HashMap<(StopId, TimeBin), f64>,
}

impl ObservedCounts {
    /// An empty store.  Every lookup is absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one value, returning the previous one for that key.
    ///
    /// Used by the loader and by tests; the calibration loop never mutates a
    /// store after startup.
    pub fn insert(&mut self, stop: StopId, bin: TimeBin, value: f64) -> Option<f64> {
        self.values.insert((stop, bin), value)
    }

    #[inline]
    pub fn get(&self, stop: StopId, bin: TimeBin) -> Option<f64> {
        self.values.get(&(stop, bin)).copied()
    }

    /// Distinct stops with at least one value, ascending.
    pub fn stops(&self) -> Vec<StopId> {
        let mut stops: Vec<StopId> = self.values.keys().map(|&(s, _)| s).collect();
        stops.sort_unstable();
        stops.dedup();
        stops
    }

    /// All values for `stop`, ordered by bin.
    pub fn series(&self, stop: StopId) -> BTreeMap<TimeBin, f64> {
        self.values
            .iter()
            .filter(|&(&(s, _), _)| s == stop)
            .map(|(&(_, bin), &v)| (bin, v))
            .collect()
    }

    /// Sum of all values for `stop`.
    pub fn total(&self, stop: StopId) -> f64 {
        self.series(stop).values().sum()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
