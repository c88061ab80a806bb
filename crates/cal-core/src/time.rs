//! Time binning.
//!
//! # Design
//!
//! Simulated time arrives as `f64` seconds since midnight of the simulated
//! day.  Counts are aggregated into fixed-width bins:
//!
//!   bin_index = floor(time / bin_size_secs)
//!
//! The bin size is fixed for the whole run.  [`BinLayout`] adds an upper
//! bound: events later than `max_time_secs` all land in one overflow bin so
//! the counter table never grows during an iteration.

use std::fmt;

use crate::{CalError, CalResult};

/// Seconds in one hour; the granularity of the observed-counts format.
pub const HOUR_SECS: u32 = 3_600;

/// Default upper bound of the binned day: 30 simulated hours.
pub const DEFAULT_MAX_TIME_SECS: u32 = 30 * HOUR_SECS;

// ── BinSize ───────────────────────────────────────────────────────────────────

/// Width of one time bin in seconds.  Always non-zero.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinSize(u32);

impl BinSize {
    /// One-hour bins.
    pub const HOURLY: BinSize = BinSize(HOUR_SECS);

    /// Validate and wrap `secs`.  Zero is a configuration error.
    pub fn new(secs: u32) -> CalResult<Self> {
        if secs == 0 {
            return Err(CalError::Config("time bin size must be > 0 seconds".into()));
        }
        Ok(BinSize(secs))
    }

    #[inline]
    pub fn secs(self) -> u32 {
        self.0
    }

    /// `true` for the one-hour granularity assumed by the counts format.
    #[inline]
    pub fn is_hourly(self) -> bool {
        self.0 == HOUR_SECS
    }

    /// Unbounded bin index for `time` seconds.  Negative times map to bin 0.
    #[inline]
    pub fn bin_of(self, time: f64) -> TimeBin {
        if time <= 0.0 {
            return TimeBin(0);
        }
        let idx = (time / self.0 as f64).floor();
        TimeBin(if idx >= u32::MAX as f64 { u32::MAX } else { idx as u32 })
    }
}

impl fmt::Display for BinSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

// ── TimeBin ───────────────────────────────────────────────────────────────────

/// Index of a time bin.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeBin(pub u32);

impl TimeBin {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Inclusive start of this bin in seconds.
    #[inline]
    pub fn start_secs(self, size: BinSize) -> u64 {
        self.0 as u64 * size.secs() as u64
    }

    /// 1-based hour label as used by the observed-counts format.  Only
    /// meaningful for hourly bins.
    #[inline]
    pub fn hour_label(self) -> u32 {
        self.0 + 1
    }
}

impl fmt::Display for TimeBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bin{}", self.0)
    }
}

// ── BinLayout ─────────────────────────────────────────────────────────────────

/// A bin size plus a fixed bin count.
///
/// `count = max_time_secs / size + 1`; the last bin collects every event at or
/// past `max_time_secs`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BinLayout {
    size:  BinSize,
    count: u32,
}

impl BinLayout {
    pub fn new(size: BinSize, max_time_secs: u32) -> CalResult<Self> {
        if size.secs() > max_time_secs {
            return Err(CalError::Config(format!(
                "time bin size {size} exceeds the binned time span of {max_time_secs}s"
            )));
        }
        Ok(Self { size, count: max_time_secs / size.secs() + 1 })
    }

    #[inline]
    pub fn size(&self) -> BinSize {
        self.size
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count as usize
    }

    /// Bin index for `time`, clamped into the overflow bin.
    #[inline]
    pub fn bin_of(&self, time: f64) -> TimeBin {
        let bin = self.size.bin_of(time);
        TimeBin(bin.0.min(self.count - 1))
    }

    /// All bins in ascending order.
    pub fn bins(self) -> impl Iterator<Item = TimeBin> {
        (0..self.count).map(TimeBin)
    }

    /// Bins overlapping field hour `hour` (`[hour·3600, (hour+1)·3600)`),
    /// each paired with the share of the bin that lies inside the hour.
    ///
    /// Sub-hour bins that divide the hour get share 1.0; coarser bins are
    /// split by time.  Hours past the last bin's nominal end yield nothing.
    pub fn hour_overlaps(self, hour: TimeBin) -> impl Iterator<Item = (TimeBin, f64)> {
        let size = self.size.secs() as u64;
        let start = hour.0 as u64 * HOUR_SECS as u64;
        let end = start + HOUR_SECS as u64;
        let first = start / size;
        let last = ((end - 1) / size).min(self.count as u64 - 1);
        (first..=last).map(move |b| {
            let bin_start = b * size;
            let overlap = (bin_start + size).min(end) - bin_start.max(start);
            (TimeBin(b as u32), overlap as f64 / size as f64)
        })
    }
}
