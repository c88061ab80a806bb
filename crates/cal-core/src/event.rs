//! The simulation events consumed by the calibration loop.

use std::fmt;

use crate::{AgentId, StopId};

/// Kind of count recorded per stop and time bin.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CountKind {
    /// A person entered a vehicle at the stop.
    Board,
    /// A person left a vehicle at the stop.
    Alight,
    /// A person was on board a vehicle departing the stop.
    Occupancy,
}

impl CountKind {
    /// Number of kinds; the innermost dimension of the counter table.
    pub const COUNT: usize = 3;

    pub const ALL: [CountKind; 3] = [CountKind::Board, CountKind::Alight, CountKind::Occupancy];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lower-case label for file and column names.
    pub fn as_str(self) -> &'static str {
        match self {
            CountKind::Board     => "board",
            CountKind::Alight    => "alight",
            CountKind::Occupancy => "occupancy",
        }
    }
}

impl fmt::Display for CountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulation event at a stop.
///
/// `Copy` and heap-free so the host can deliver it by reference at event
/// rate without allocating.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimEvent {
    /// Simulated seconds since the start of the day.
    pub time:  f64,
    pub agent: AgentId,
    pub stop:  StopId,
    pub kind:  CountKind,
}

impl SimEvent {
    #[inline]
    pub fn new(time: f64, agent: AgentId, stop: StopId, kind: CountKind) -> Self {
        Self { time, agent, stop, kind }
    }

    #[inline]
    pub fn board(time: f64, agent: AgentId, stop: StopId) -> Self {
        Self::new(time, agent, stop, CountKind::Board)
    }

    #[inline]
    pub fn alight(time: f64, agent: AgentId, stop: StopId) -> Self {
        Self::new(time, agent, stop, CountKind::Alight)
    }

    #[inline]
    pub fn occupancy(time: f64, agent: AgentId, stop: StopId) -> Self {
        Self::new(time, agent, stop, CountKind::Occupancy)
    }
}
