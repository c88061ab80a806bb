//! Calibration configuration.
//!
//! Owned by the host application; the calibration loop only reads it.
//! Typically deserialized from JSON by the application crate (enable the
//! `serde` feature) and passed to `cal_control::CalibrationBuilder`.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::time::{DEFAULT_MAX_TIME_SECS, HOUR_SECS};
use crate::{BinLayout, BinSize, CalError, CalResult, EntitySpec, StopId};

// ── DistanceFilter ────────────────────────────────────────────────────────────

/// Restrict comparison output to stops within `radius_m` of `center`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceFilter {
    pub radius_m: f64,
    /// Must be one of the calibrated stops.
    pub center:   StopId,
}

// ── OutputFormats ─────────────────────────────────────────────────────────────

/// Which comparison artifacts to emit.  Parsed from free-form tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputFormats {
    pub kml: bool,
    pub txt: bool,
}

impl OutputFormats {
    /// Parse tags.  `kml`, `txt`, and `all` are recognised
    /// (case-insensitive); anything else is ignored.
    pub fn parse<S: AsRef<str>>(tags: &[S]) -> Self {
        let mut formats = OutputFormats::default();
        for tag in tags {
            match tag.as_ref().trim().to_ascii_lowercase().as_str() {
                "kml" => formats.kml = true,
                "txt" => formats.txt = true,
                "all" => {
                    formats.kml = true;
                    formats.txt = true;
                }
                other => log::debug!("ignoring unrecognised output format tag {other:?}"),
            }
        }
        formats
    }

    #[inline]
    pub fn any(&self) -> bool {
        self.kml || self.txt
    }
}

// ── CalibrationConfig ─────────────────────────────────────────────────────────

/// Top-level calibration configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalibrationConfig {
    /// The calibrated stops.  Fixed for the run.
    pub calibrated_stops: Vec<EntitySpec>,

    /// Seconds per time bin.  Default: 3600.  Comparison reports only work
    /// with hourly bins.
    pub time_bin_secs: u32,

    /// Events at or after this time share one overflow bin.  Default: 30 h.
    pub max_time_secs: u32,

    /// Diagnostics and comparisons run on iterations divisible by this.
    pub counts_interval: u32,

    /// Multiplier from the sampled population to full-scale counts.
    pub counts_scale_factor: f64,

    pub distance_filter: Option<DistanceFilter>,

    /// Comparison output tags, see [`OutputFormats::parse`].
    pub output_formats: Vec<String>,

    /// Hand the engine a flow-analysis path on active iterations.
    pub write_flow_analysis: bool,

    /// Observed occupancy counts.  Required unless supplied pre-loaded.
    pub occupancy_counts: Option<PathBuf>,
    pub board_counts:     Option<PathBuf>,
    /// Enables the comparison report when set.
    pub alight_counts:    Option<PathBuf>,

    /// Stops included in the per-iteration occupancy dump.  `None` = all
    /// calibrated stops.
    pub diagnostic_stops: Option<Vec<StopId>>,

    /// Offsets file to resume from.  A missing file is not an error.
    pub resume_offsets: Option<PathBuf>,

    /// Root of the iteration output tree.
    pub output_dir: PathBuf,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            calibrated_stops:    Vec::new(),
            time_bin_secs:       HOUR_SECS,
            max_time_secs:       DEFAULT_MAX_TIME_SECS,
            counts_interval:     10,
            counts_scale_factor: 1.0,
            distance_filter:     None,
            output_formats:      Vec::new(),
            write_flow_analysis: false,
            occupancy_counts:    None,
            board_counts:        None,
            alight_counts:       None,
            diagnostic_stops:    None,
            resume_offsets:      None,
            output_dir:          PathBuf::from("output"),
        }
    }
}

impl CalibrationConfig {
    /// Check internal consistency.  Called once at startup.
    pub fn validate(&self) -> CalResult<()> {
        let size = BinSize::new(self.time_bin_secs)?;
        BinLayout::new(size, self.max_time_secs)?;

        if self.counts_interval == 0 {
            return Err(CalError::Config("counts interval must be >= 1".into()));
        }
        if !self.counts_scale_factor.is_finite() || self.counts_scale_factor <= 0.0 {
            return Err(CalError::Config(format!(
                "counts scale factor must be finite and positive, got {}",
                self.counts_scale_factor
            )));
        }
        if self.calibrated_stops.is_empty() {
            return Err(CalError::Config("calibrated stop set is empty".into()));
        }

        let mut seen = HashSet::with_capacity(self.calibrated_stops.len());
        for spec in &self.calibrated_stops {
            if !seen.insert(spec.stop) {
                return Err(CalError::DuplicateStop(spec.stop));
            }
        }

        if let Some(filter) = &self.distance_filter {
            if !filter.radius_m.is_finite() || filter.radius_m <= 0.0 {
                return Err(CalError::Config(format!(
                    "distance filter radius must be positive, got {}",
                    filter.radius_m
                )));
            }
            if !seen.contains(&filter.center) {
                return Err(CalError::Config(format!(
                    "distance filter center {} is not a calibrated stop",
                    filter.center
                )));
            }
        }
        Ok(())
    }

    /// The validated bin layout.
    pub fn bin_layout(&self) -> CalResult<BinLayout> {
        BinLayout::new(BinSize::new(self.time_bin_secs)?, self.max_time_secs)
    }

    pub fn formats(&self) -> OutputFormats {
        OutputFormats::parse(&self.output_formats)
    }

    /// `true` on iterations where diagnostics and comparisons are due.
    #[inline]
    pub fn is_active_iteration(&self, iteration: u32) -> bool {
        self.counts_interval > 0 && iteration.is_multiple_of(self.counts_interval)
    }
}
