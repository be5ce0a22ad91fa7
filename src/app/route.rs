// LogRoute - app/route.rs
//
// Streams one input through a router: read a bounded chunk of lines,
// classify it in parallel, write the accepted lines, flush, repeat.
// Memory use is bounded by the chunk size, not by the input length.

use crate::app::output::{self, OutputFormat};
use crate::core::model::RouteSummary;
use crate::core::router::CategoryRouter;
use crate::platform::fs::LineChunks;
use crate::util::constants;
use crate::util::error::LogRouteError;
use crate::util::logging;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Options for one routing pass.
#[derive(Debug, Clone, Copy)]
pub struct RouteOptions {
    pub format: OutputFormat,

    /// Write accepted lines as they are routed. Off for count-only runs.
    pub emit_lines: bool,

    /// Upper bound on lines classified per batch.
    pub chunk_lines: usize,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            emit_lines: true,
            chunk_lines: constants::ROUTE_CHUNK_LINES,
        }
    }
}

/// Route every line `reader` yields and return the tally.
///
/// `source` labels the input in output and errors ("-" for stdin). Line
/// numbers are 1-based and continuous across chunks. Output for each chunk
/// is flushed before the next chunk is read.
pub fn route_stream<R, W>(
    router: &CategoryRouter,
    reader: R,
    source: &str,
    out: &mut W,
    options: RouteOptions,
) -> Result<RouteSummary, LogRouteError>
where
    R: Read,
    W: Write,
{
    let mut summary = router.summarise(&[], 0);
    let mut next_line = 1u64;

    for chunk in LineChunks::new(reader, options.chunk_lines) {
        let lines = chunk.map_err(|e| LogRouteError::Io {
            path: PathBuf::from(source),
            operation: "read",
            source: e,
        })?;

        let routed = router.route_lines(&lines, next_line);

        tracing::trace!(
            source,
            first_line = next_line,
            lines = lines.len(),
            routed = routed.len(),
            first = routed
                .first()
                .map(|r| logging::preview(&r.message))
                .unwrap_or(""),
            "Chunk classified"
        );

        next_line += lines.len() as u64;
        summary.absorb(router.summarise(&routed, lines.len() as u64));

        if options.emit_lines && !routed.is_empty() {
            output::write_routed(&mut *out, source, &routed, options.format)
                .and_then(|()| out.flush())
                .map_err(output_error)?;
        }
    }

    tracing::debug!(
        source,
        lines = summary.total,
        unmatched = summary.unmatched,
        "Input routed"
    );

    Ok(summary)
}

/// Wrap a failure writing routed output.
pub fn output_error(e: io::Error) -> LogRouteError {
    LogRouteError::Io {
        path: PathBuf::from("<stdout>"),
        operation: "write",
        source: e,
    }
}
