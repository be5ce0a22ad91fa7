// LogRoute - core/classifier.rs
//
// The classification filter: one event in, one decision out.
// Core layer: pure logic, no I/O, no logging of its own decisions.

use crate::core::category::Category;
use crate::core::model::{Decision, RenderedMessage};
use std::sync::Arc;

/// Decide whether `message` belongs to `category`.
///
/// Accepts iff the message contains at least one marker. An absent message
/// never matches. This never fails and never panics.
pub fn decide(message: Option<&str>, category: &Category) -> Decision {
    match message {
        Some(text) => Decision::from_match(category.matches(text)),
        None => Decision::Deny,
    }
}

/// A filter bound to one category, cheap to clone and share across threads.
#[derive(Debug, Clone)]
pub struct ClassificationFilter {
    category: Arc<Category>,
}

impl ClassificationFilter {
    pub fn new(category: Arc<Category>) -> Self {
        Self { category }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    /// A shared handle to the bound category.
    pub fn shared_category(&self) -> Arc<Category> {
        Arc::clone(&self.category)
    }

    /// Classify a single event.
    pub fn decide<E>(&self, event: &E) -> Decision
    where
        E: RenderedMessage + ?Sized,
    {
        decide(event.rendered_message(), &self.category)
    }
}

impl From<Category> for ClassificationFilter {
    fn from(category: Category) -> Self {
        Self::new(Arc::new(category))
    }
}
