//! The calibrated-entity arena.
//!
//! Every calibrated stop gets a dense [`EntityId`] at startup, in the order
//! the stops were configured.  Counter tables downstream are flat arrays
//! indexed by that id, so the hot path never hashes a stop identifier.
//!
//! Lookup from the host's [`StopId`] goes through a direct-address table
//! (`slots[stop] -> EntityId`), sized by the largest calibrated stop id.

use crate::{CalError, CalResult, EntityId, GeoPoint, StopId};

/// Largest stop id accepted into the direct-address table.  Keeps the slot
/// table under 256 MB for pathological id spaces.
pub const MAX_STOP_ID: u32 = 1 << 26;

/// One calibrated stop as configured.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitySpec {
    pub stop:  StopId,
    /// Human-readable label used in reports.
    pub name:  String,
    pub coord: GeoPoint,
}

impl EntitySpec {
    pub fn new(stop: StopId, name: impl Into<String>, coord: GeoPoint) -> Self {
        Self { stop, name: name.into(), coord }
    }
}

/// Fixed set of calibrated stops.  Built once; never mutated.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    specs: Vec<EntitySpec>,
    slots: Vec<EntityId>,
}

impl EntityRegistry {
    /// Build the arena.
    ///
    /// # Errors
    ///
    /// - empty `specs`
    /// - a stop listed twice
    /// - a stop id above [`MAX_STOP_ID`]
    pub fn new(specs: Vec<EntitySpec>) -> CalResult<Self> {
        if specs.is_empty() {
            return Err(CalError::Config("calibrated stop set is empty".into()));
        }
        if specs.len() > u32::MAX as usize {
            return Err(CalError::Config("too many calibrated stops".into()));
        }

        let max_stop = specs.iter().map(|s| s.stop.0).max().unwrap_or(0);
        if max_stop > MAX_STOP_ID {
            return Err(CalError::Config(format!(
                "stop id {max_stop} exceeds the supported maximum {MAX_STOP_ID}"
            )));
        }

        let mut slots = vec![EntityId::INVALID; max_stop as usize + 1];
        for (i, spec) in specs.iter().enumerate() {
            let slot = &mut slots[spec.stop.index()];
            if slot.is_valid() {
                return Err(CalError::DuplicateStop(spec.stop));
            }
            *slot = EntityId(i as u32);
        }

        Ok(Self { specs, slots })
    }

    /// Resolve a stop to its dense id.  `None` for uncalibrated stops.
    ///
    /// O(1), no hashing, no allocation.
    #[inline]
    pub fn lookup(&self, stop: StopId) -> Option<EntityId> {
        match self.slots.get(stop.index()) {
            Some(&id) if id.is_valid() => Some(id),
            _ => None,
        }
    }

    #[inline]
    pub fn contains(&self, stop: StopId) -> bool {
        self.lookup(stop).is_some()
    }

    /// Configured spec for `entity`.
    ///
    /// # Panics
    /// Panics if `entity` was not issued by this registry.
    #[inline]
    pub fn spec(&self, entity: EntityId) -> &EntitySpec {
        &self.specs[entity.index()]
    }

    #[inline]
    pub fn stop(&self, entity: EntityId) -> StopId {
        self.specs[entity.index()].stop
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// All entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntitySpec)> {
        self.specs
            .iter()
            .enumerate()
            .map(|(i, s)| (EntityId(i as u32), s))
    }

    /// All entity ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + use<> {
        (0..self.specs.len() as u32).map(EntityId)
    }
}
