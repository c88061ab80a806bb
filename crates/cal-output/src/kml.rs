//! KML comparison backend.
//!
//! Creates `<i>.countsCompare.kml`: one placemark per compared stop, located
//! at the stop's coordinate, whose description holds an hourly table of all
//! three series side by side.  Only hours with a non-zero simulated count or
//! an observation are listed.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use cal_core::EntityId;

use crate::writer::ComparisonWriter;
use crate::{ComparisonRecord, ComparisonSet, OutputLayout, OutputResult};

pub const KML_FILE_NAME: &str = "countsCompare.kml";

/// Writes all three series into a single KML document.
pub struct KmlWriter;

impl KmlWriter {
    fn placemark(
        out:    &mut String,
        set:    &ComparisonSet<'_>,
        entity: EntityId,
        rows:   &[(&ComparisonRecord, &ComparisonRecord, &ComparisonRecord)],
    ) {
        let spec = set.registry.spec(entity);
        let cell = |r: &ComparisonRecord| match r.observed {
            Some(obs) => format!("<td>{:.1}</td><td>{:.1}</td>", r.simulated, obs),
            None => format!("<td>{:.1}</td><td>-</td>", r.simulated),
        };

        let mut table = String::from(
            "<table><tr><th>hour</th><th>board sim</th><th>board obs</th>\
             <th>alight sim</th><th>alight obs</th><th>occup sim</th><th>occup obs</th></tr>",
        );
        for &(board, alight, occupancy) in rows {
            let listed = [board, alight, occupancy]
                .iter()
                .any(|r| r.simulated > 0.0 || r.observed.is_some());
            if !listed {
                continue;
            }
            let _ = write!(
                table,
                "<tr><td>{}</td>{}{}{}</tr>",
                board.bin.hour_label(),
                cell(board),
                cell(alight),
                cell(occupancy)
            );
        }
        table.push_str("</table>");

        let _ = write!(
            out,
            "<Placemark><name>{} ({})</name><description><![CDATA[{}]]></description>\
             <Point><coordinates>{:.6},{:.6},0</coordinates></Point></Placemark>\n",
            escape(&spec.name),
            spec.stop.0,
            table,
            spec.coord.lon,
            spec.coord.lat,
        );
    }
}

impl ComparisonWriter for KmlWriter {
    fn format(&self) -> &'static str {
        "kml"
    }

    fn write(&self, iteration: u32, set: &ComparisonSet<'_>, layout: &OutputLayout) -> OutputResult<Vec<PathBuf>> {
        let mut body = String::new();

        // All three series are built over the same stops and bins in the
        // same order, so they zip row for row.
        let rows: Vec<_> = set
            .board
            .iter()
            .zip(&set.alight)
            .zip(&set.occupancy)
            .map(|((b, a), o)| (b, a, o))
            .collect();
        for chunk in rows.chunk_by(|x, y| x.0.entity == y.0.entity) {
            Self::placemark(&mut body, set, chunk[0].0.entity, chunk);
        }

        let path = layout.iteration_file(iteration, KML_FILE_NAME);
        let mut out = BufWriter::new(File::create(&path)?);
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(out, r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#)?;
        writeln!(out, "<Document>")?;
        writeln!(out, "<name>Counts comparison, iteration {iteration}</name>")?;
        out.write_all(body.as_bytes())?;
        writeln!(out, "</Document>")?;
        writeln!(out, "</kml>")?;
        out.flush()?;

        Ok(vec![path])
    }
}

/// Escape the five XML special characters.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&'  => out.push_str("&amp;"),
            '<'  => out.push_str("&lt;"),
            '>'  => out.push_str("&gt;"),
            '"'  => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c    => out.push(c),
        }
    }
    out
}
