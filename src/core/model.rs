// LogRoute - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// dependency on the host logging framework.
//
// These types are the shared vocabulary across all layers.

use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// Log event (input boundary)
// =============================================================================

/// Anything that can hand the classifier its rendered message text.
///
/// The message may be absent (an event with no message field, or a record
/// the host could not render). Absent messages never match any category.
pub trait RenderedMessage {
    /// The event's already-formatted message, if it has one.
    fn rendered_message(&self) -> Option<&str>;
}

impl RenderedMessage for str {
    fn rendered_message(&self) -> Option<&str> {
        Some(self)
    }
}

impl RenderedMessage for String {
    fn rendered_message(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<'a> RenderedMessage for Option<&'a str> {
    fn rendered_message(&self) -> Option<&str> {
        *self
    }
}

/// A borrowed view of a single log record.
///
/// Owned by the logging subsystem; the classifier only reads it for the
/// duration of one decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogEvent<'a> {
    /// Rendered message text. `None` when the record carries no message.
    pub message: Option<&'a str>,
}

impl<'a> LogEvent<'a> {
    pub fn new(message: &'a str) -> Self {
        Self {
            message: Some(message),
        }
    }

    /// An event without any message text.
    pub fn without_message() -> Self {
        Self { message: None }
    }
}

impl RenderedMessage for LogEvent<'_> {
    fn rendered_message(&self) -> Option<&str> {
        self.message
    }
}

// =============================================================================
// Decision
// =============================================================================

/// Outcome of classifying one event against one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    /// Pass the event to the category's downstream destination.
    Accept,
    /// Suppress the event for this category.
    Deny,
}

impl Decision {
    pub fn from_match(matched: bool) -> Self {
        if matched {
            Decision::Accept
        } else {
            Decision::Deny
        }
    }

    pub fn is_accept(self) -> bool {
        self == Decision::Accept
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Accept => "ACCEPT",
            Decision::Deny => "DENY",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Routing output
// =============================================================================

/// A line that at least one category accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutedLine {
    /// 1-based position of the line in its input.
    pub line_number: u64,

    /// Names of the accepting categories, in router registration order.
    pub categories: Vec<String>,

    /// The line text as classified.
    pub message: String,
}

/// Aggregate counts over one routing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    /// Lines examined.
    pub total: u64,

    /// Lines no category accepted.
    pub unmatched: u64,

    /// Accepted line count per category name. Every routed category is
    /// present, including those with zero accepts.
    pub per_category: BTreeMap<String, u64>,
}

impl RouteSummary {
    /// Fold the tally of a later chunk into this one.
    pub fn absorb(&mut self, other: RouteSummary) {
        self.total += other.total;
        self.unmatched += other.unmatched;
        for (name, count) in other.per_category {
            *self.per_category.entry(name).or_insert(0) += count;
        }
    }
}
