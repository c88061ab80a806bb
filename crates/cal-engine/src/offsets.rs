//! `CostOffsets`: the per-stop adjustment values handed to route choice.

use std::collections::BTreeMap;

use cal_core::StopId;

/// Offset per stop, ordered by stop id.
///
/// Keyed by the host's `StopId` rather than the dense `EntityId` so the map
/// stays meaningful outside the process (offset files, route choice).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostOffsets(BTreeMap<StopId, f64>);

impl CostOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stop: StopId, offset: f64) -> Option<f64> {
        self.0.insert(stop, offset)
    }

    #[inline]
    pub fn get(&self, stop: StopId) -> Option<f64> {
        self.0.get(&stop).copied()
    }

    /// Offsets in ascending stop order.
    pub fn iter(&self) -> impl Iterator<Item = (StopId, f64)> + '_ {
        self.0.iter().map(|(&s, &v)| (s, v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest absolute offset, 0 for an empty map.
    pub fn max_abs(&self) -> f64 {
        self.0.values().fold(0.0, |acc, v| acc.max(v.abs()))
    }
}

impl FromIterator<(StopId, f64)> for CostOffsets {
    fn from_iter<I: IntoIterator<Item = (StopId, f64)>>(iter: I) -> Self {
        CostOffsets(iter.into_iter().collect())
    }
}
