//! The `ComparisonWriter` trait implemented by all report backends.

use std::path::PathBuf;

use crate::{ComparisonSet, OutputLayout, OutputResult};

/// Trait implemented by the txt and kml backends.
///
/// Writers are stateless between iterations; each call writes a complete,
/// self-contained set of files into the iteration directory (which the
/// caller has already created) and returns their paths.
pub trait ComparisonWriter {
    /// Format tag, for log lines.
    fn format(&self) -> &'static str;

    fn write(&self, iteration: u32, set: &ComparisonSet<'_>, layout: &OutputLayout) -> OutputResult<Vec<PathBuf>>;
}
