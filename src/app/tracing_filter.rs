// LogRoute - app/tracing_filter.rs
//
// Adapts the classification filter to the `tracing` pipeline as a
// per-layer filter. A DENY only silences the layer the filter is attached
// to; every other layer still sees the event.
//
// Nothing in this module emits tracing events: a filter that logs would
// classify its own output.

use crate::core::category::Category;
use crate::core::classifier::ClassificationFilter;
use crate::core::router::CategoryRouter;
use crate::util::constants;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Filter, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Per-layer `tracing` filter that passes only events whose `message`
/// field belongs to one category.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    inner: ClassificationFilter,
}

impl CategoryFilter {
    pub fn new(category: Arc<Category>) -> Self {
        Self {
            inner: ClassificationFilter::new(category),
        }
    }
}

impl<S> Filter<S> for CategoryFilter {
    // Categories are decided on message text only, so every callsite stays
    // enabled and the real decision happens per event.
    fn enabled(&self, _meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        true
    }

    fn event_enabled(&self, event: &Event<'_>, _cx: &Context<'_, S>) -> bool {
        let mut visitor = MessageVisitor::new(constants::MAX_MESSAGE_SCAN_BYTES);
        event.record(&mut visitor);
        self.inner.decide(&visitor.message()).is_accept()
    }
}

/// An `fmt` layer that writes only the events accepted by `category`.
pub fn category_layer<S, W>(category: Arc<Category>, make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_writer(make_writer)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .with_filter(CategoryFilter::new(category))
}

/// One `category_layer` per routed category. `make_writer_for` is called
/// with each category name to pick that category's destination.
pub fn router_layers<S, W, F>(
    router: &CategoryRouter,
    mut make_writer_for: F,
) -> Vec<Box<dyn Layer<S> + Send + Sync + 'static>>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    F: FnMut(&str) -> W,
{
    router
        .filters()
        .iter()
        .map(|filter| {
            let category = filter.shared_category();
            let writer = make_writer_for(category.name());
            category_layer(category, writer).boxed()
        })
        .collect()
}

// =============================================================================
// Message extraction
// =============================================================================

/// Collects the `message` field of an event into a size-bounded buffer.
struct MessageVisitor {
    buf: BoundedBuf,
    found: bool,
}

impl MessageVisitor {
    fn new(limit: usize) -> Self {
        Self {
            buf: BoundedBuf::new(limit),
            found: false,
        }
    }

    fn message(&self) -> Option<&str> {
        self.found.then_some(self.buf.text.as_str())
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == constants::MESSAGE_FIELD_NAME {
            self.found = true;
            let _ = self.buf.write_str(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == constants::MESSAGE_FIELD_NAME {
            self.found = true;
            // A full buffer stops the formatter early; what fit is kept.
            let _ = write!(self.buf, "{value:?}");
        }
    }
}

/// A `fmt::Write` sink that keeps at most `limit` bytes, cut on a char
/// boundary, and reports `fmt::Error` once full.
struct BoundedBuf {
    text: String,
    limit: usize,
}

impl BoundedBuf {
    fn new(limit: usize) -> Self {
        Self {
            text: String::with_capacity(constants::MESSAGE_BUFFER_INITIAL_CAPACITY.min(limit)),
            limit,
        }
    }
}

impl fmt::Write for BoundedBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let remaining = self.limit.saturating_sub(self.text.len());
        if s.len() <= remaining {
            self.text.push_str(s);
            return Ok(());
        }
        let mut end = remaining;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.text.push_str(&s[..end]);
        Err(fmt::Error)
    }
}
