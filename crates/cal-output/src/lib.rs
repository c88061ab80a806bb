//! `cal-output`: simulated-vs-observed comparisons and their writers.
//!
//! Two backends are selected by format tag:
//!
//! | Tag      | Backend      | Files per active iteration                                  |
//! |----------|--------------|-------------------------------------------------------------|
//! | `txt`    | [`TxtWriter`]| `countsCompareBoarding.txt`, `…Alighting.txt`, `…Occupancy.txt` |
//! | `kml`    | [`KmlWriter`]| `countsCompare.kml` (all three series per stop placemark)   |
//! | `all`    | both         |                                                             |
//!
//! Both implement [`ComparisonWriter`] and are driven by
//! [`ComparisonReporter`], which also owns the gating rules.  Every file
//! lands in the iteration directory given by [`OutputLayout`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use cal_output::{ComparisonReporter, OutputLayout, ReportInputs};
//!
//! let reporter = ComparisonReporter::from_config(&config);
//! let outcome = reporter.report(iteration, &inputs);
//! ```

pub mod comparison;
pub mod error;
pub mod kml;
pub mod layout;
pub mod reporter;
pub mod txt;
pub mod writer;


pub use comparison::{ComparisonRecord, ComparisonSet, build_comparison};
pub use error::{OutputError, OutputResult};
pub use kml::KmlWriter;
pub use layout::OutputLayout;
pub use reporter::{ComparisonReporter, ReportInputs, ReportOutcome, SkipReason};
pub use txt::TxtWriter;
pub use writer::ComparisonWriter;
