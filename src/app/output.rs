// LogRoute - app/output.rs
//
// Rendering of routed lines, summaries, and category listings.
// Writes to any Write trait object so the CLI and tests share one path.

use crate::core::category::Category;
use crate::core::model::{RouteSummary, RoutedLine};
use serde::Serialize;
use std::io::{self, Write};

/// How routed lines are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `source:line [cat,cat] message`
    #[default]
    Text,
    /// One JSON object per line.
    JsonLines,
}

#[derive(Serialize)]
struct SourcedLine<'a> {
    source: &'a str,
    #[serde(flatten)]
    line: &'a RoutedLine,
}

/// Write routed lines from one input. `source` names the input ("-" for stdin).
pub fn write_routed<W: Write>(
    mut out: W,
    source: &str,
    routed: &[RoutedLine],
    format: OutputFormat,
) -> io::Result<()> {
    for line in routed {
        match format {
            OutputFormat::Text => writeln!(
                out,
                "{source}:{} [{}] {}",
                line.line_number,
                line.categories.join(","),
                line.message
            )?,
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut out, &SourcedLine { source, line })?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// Write per-category counts.
pub fn write_summary<W: Write>(
    mut out: W,
    summary: &RouteSummary,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            for (name, count) in &summary.per_category {
                writeln!(out, "{name}\t{count}")?;
            }
            writeln!(out, "(unmatched)\t{}", summary.unmatched)?;
            writeln!(out, "(total)\t{}", summary.total)?;
        }
        OutputFormat::JsonLines => {
            serde_json::to_writer(&mut out, summary)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Write one line per category: name, origin, markers, description.
pub fn write_category_list<W: Write>(mut out: W, categories: &[&Category]) -> io::Result<()> {
    for category in categories {
        let origin = if category.is_builtin() { "builtin" } else { "user" };
        write!(
            out,
            "{}\t{origin}\t{}",
            category.name(),
            category.markers().join(",")
        )?;
        if !category.description().is_empty() {
            write!(out, "\t{}", category.description())?;
        }
        writeln!(out)?;
    }
    Ok(())
}
