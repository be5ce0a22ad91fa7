// LogRoute - core/router.rs
//
// Evaluates several categories independently over the same messages.
// Each category decides on its own: a message carrying markers from two
// categories is routed to both.

use crate::core::category::Category;
use crate::core::classifier::ClassificationFilter;
use crate::core::model::{RenderedMessage, RouteSummary, RoutedLine};
use crate::util::error::CategoryError;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// A set of uniquely named category filters, in registration order.
#[derive(Debug, Clone)]
pub struct CategoryRouter {
    filters: Vec<ClassificationFilter>,
}

impl CategoryRouter {
    /// Build a router. Category names must be unique.
    pub fn new(categories: Vec<Category>) -> Result<Self, CategoryError> {
        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.name().to_string()) {
                return Err(CategoryError::DuplicateName {
                    name: category.name().to_string(),
                });
            }
        }

        let filters = categories
            .into_iter()
            .map(|c| ClassificationFilter::new(Arc::new(c)))
            .collect();
        Ok(Self { filters })
    }

    /// Keep only the named categories, in the order first given.
    ///
    /// An empty `names` slice selects everything. Repeated names are
    /// selected once.
    pub fn select(self, names: &[String]) -> Result<Self, CategoryError> {
        if names.is_empty() {
            return Ok(self);
        }

        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            if selected
                .iter()
                .any(|f: &ClassificationFilter| f.category().name() == name)
            {
                tracing::debug!(category = %name, "Category selected more than once");
                continue;
            }
            let filter = self
                .filters
                .iter()
                .find(|f| f.category().name() == name)
                .ok_or_else(|| CategoryError::UnknownCategory {
                    name: name.clone(),
                    available: self.names().map(str::to_string).collect(),
                })?;
            selected.push(filter.clone());
        }
        Ok(Self { filters: selected })
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|f| f.category().name())
    }

    pub fn filters(&self) -> &[ClassificationFilter] {
        &self.filters
    }

    /// Names of the categories that accept `event`, in registration order.
    pub fn route<E>(&self, event: &E) -> Vec<&str>
    where
        E: RenderedMessage + ?Sized,
    {
        self.filters
            .iter()
            .filter(|f| f.decide(event).is_accept())
            .map(|f| f.category().name())
            .collect()
    }

    /// Classify a batch of lines in parallel.
    ///
    /// Only accepted lines are returned, in input order. Line numbers are
    /// 1-based positions in `lines` offset by `first_line_number - 1`.
    pub fn route_lines(&self, lines: &[String], first_line_number: u64) -> Vec<RoutedLine> {
        lines
            .par_iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                let categories = self.route(line.as_str());
                if categories.is_empty() {
                    return None;
                }
                Some(RoutedLine {
                    line_number: first_line_number + idx as u64,
                    categories: categories.into_iter().map(str::to_string).collect(),
                    message: line.clone(),
                })
            })
            .collect()
    }

    /// Tally `routed` lines against this router's categories.
    pub fn summarise(&self, routed: &[RoutedLine], total: u64) -> RouteSummary {
        let mut summary = RouteSummary {
            total,
            unmatched: total.saturating_sub(routed.len() as u64),
            ..Default::default()
        };
        for name in self.names() {
            summary.per_category.insert(name.to_string(), 0);
        }
        for line in routed {
            for name in &line.categories {
                *summary.per_category.entry(name.clone()).or_insert(0) += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::category::load_builtin_categories;

    fn builtin_router() -> CategoryRouter {
        CategoryRouter::new(load_builtin_categories()).unwrap()
    }

    fn lines(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_route_reports_all_accepting_categories() {
        let router = builtin_router();
        assert_eq!(router.route("Order 42: PartialFill qty=10"), vec!["fills"]);
        assert_eq!(router.route("Received Bid @ 101.5"), vec!["orders"]);
        assert_eq!(
            router.route("Bid 9 hit: TotalFill qty=1"),
            vec!["fills", "orders"]
        );
        assert!(router.route("Heartbeat tick").is_empty());
        assert!(router.route("").is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let a = Category::new("fills", ["PartialFill"]).unwrap();
        let b = Category::new("fills", ["TotalFill"]).unwrap();
        assert!(matches!(
            CategoryRouter::new(vec![a, b]),
            Err(CategoryError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_select_keeps_requested_order() {
        let router = builtin_router()
            .select(&["orders".to_string(), "fills".to_string()])
            .unwrap();
        assert_eq!(router.names().collect::<Vec<_>>(), ["orders", "fills"]);
        assert_eq!(
            router.route("Ask 3 partially filled: PartialFill"),
            vec!["orders", "fills"]
        );
    }

    #[test]
    fn test_select_unknown_category() {
        let err = builtin_router()
            .select(&["cancels".to_string()])
            .unwrap_err();
        match err {
            CategoryError::UnknownCategory { name, available } => {
                assert_eq!(name, "cancels");
                assert_eq!(available, ["fills", "orders"]);
            }
            other => panic!("Expected UnknownCategory, got: {other:?}"),
        }
    }

    #[test]
    fn test_select_empty_keeps_all() {
        let router = builtin_router().select(&[]).unwrap();
        assert_eq!(router.len(), 2);
        assert!(!router.is_empty());
    }

    #[test]
    fn test_select_repeated_name_once() {
        let router = builtin_router()
            .select(&["fills".to_string(), "orders".to_string(), "fills".to_string()])
            .unwrap();
        assert_eq!(router.names().collect::<Vec<_>>(), ["fills", "orders"]);
        assert_eq!(router.route("Bid hit: TotalFill"), vec!["fills", "orders"]);
    }

    #[test]
    fn test_router_without_categories_is_empty() {
        let router = CategoryRouter::new(Vec::new()).unwrap();
        assert!(router.is_empty());
        assert!(router.route("Bid hit: TotalFill").is_empty());
        assert!(router.route_lines(&lines(&["Ask 1"]), 1).is_empty());
    }

    #[test]
    fn test_route_lines_preserves_order_and_numbers() {
        let router = builtin_router();
        let input = lines(&[
            "Heartbeat tick",
            "Order 1: Ask 100 @ 10.0",
            "Order 1: PartialFill qty=40",
            "Heartbeat tick",
            "Order 1: TotalFill qty=60",
        ]);
        let routed = router.route_lines(&input, 1);
        let numbers: Vec<u64> = routed.iter().map(|r| r.line_number).collect();
        assert_eq!(numbers, [2, 3, 5]);
        assert_eq!(routed[0].categories, ["orders"]);
        assert_eq!(routed[1].categories, ["fills"]);
        assert_eq!(routed[2].message, "Order 1: TotalFill qty=60");
    }

    #[test]
    fn test_route_lines_large_batch_keeps_order() {
        let router = builtin_router();
        let input: Vec<String> = (0..10_000)
            .map(|i| {
                if i % 3 == 0 {
                    format!("Order {i}: Bid")
                } else {
                    format!("tick {i}")
                }
            })
            .collect();
        let routed = router.route_lines(&input, 1);
        assert_eq!(routed.len(), 3_334);
        assert!(routed.windows(2).all(|w| w[0].line_number < w[1].line_number));
    }

    #[test]
    fn test_summarise_counts() {
        let router = builtin_router();
        let input = lines(&[
            "Bid 1: PartialFill",
            "Ask 2",
            "noise",
            "TotalFill 3",
        ]);
        let routed = router.route_lines(&input, 1);
        let summary = router.summarise(&routed, input.len() as u64);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.per_category["fills"], 2);
        assert_eq!(summary.per_category["orders"], 2);
    }

    #[test]
    fn test_summarise_includes_zero_counts() {
        let router = builtin_router();
        let summary = router.summarise(&[], 3);
        assert_eq!(summary.unmatched, 3);
        assert_eq!(summary.per_category["fills"], 0);
        assert_eq!(summary.per_category["orders"], 0);
    }
}
