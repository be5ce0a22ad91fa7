// LogRoute - tests/e2e_routing.rs
//
// End-to-end tests for category loading and routing.
//
// These tests exercise the real filesystem, real category loading from
// TOML files, and a real tracing subscriber with per-category layers.
// No mocks, no stubs.

use logroute::app::category_mgr::{load_all_categories, load_for_routing};
use logroute::app::output::{self, OutputFormat};
use logroute::app::route::{route_stream, RouteOptions};
use logroute::app::tracing_filter::{category_layer, router_layers};
use logroute::core::category::Category;
use logroute::core::model::Decision;
use logroute::core::router::CategoryRouter;
use logroute::platform::{config, fs::LineChunks};
use logroute::util::constants;
use logroute::util::error::{CategoryError, LogRouteError};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::Registry;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Every line of a fixture, read the way the CLI reads input.
fn fixture_lines(name: &str) -> Vec<String> {
    let file = fs::File::open(fixture(name)).expect("open fixture");
    LineChunks::new(file, constants::ROUTE_CHUNK_LINES)
        .collect::<io::Result<Vec<_>>>()
        .expect("read fixture")
        .concat()
}

fn builtin_router() -> CategoryRouter {
    let (categories, errors) = load_all_categories(None, &[]);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    CategoryRouter::new(categories).unwrap()
}

/// In-memory writer shared between a tracing layer and the test.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// =============================================================================
// Classification scenarios
// =============================================================================

/// The six reference scenarios for fills and orders.
#[test]
fn e2e_reference_scenarios() {
    let router = builtin_router();
    let fills = &router.filters()[0];
    let orders = &router.filters()[1];
    assert_eq!(fills.category().name(), "fills");
    assert_eq!(orders.category().name(), "orders");

    assert_eq!(fills.decide("Order 42: PartialFill qty=10"), Decision::Accept);
    assert_eq!(fills.decide("Order 42: New qty=10"), Decision::Deny);
    assert_eq!(orders.decide("Received Bid @ 101.5"), Decision::Accept);
    assert_eq!(orders.decide("Heartbeat tick"), Decision::Deny);
    assert_eq!(orders.decide(""), Decision::Deny);

    // Disjoint categories both accept only when both marker sets appear.
    for message in [
        "Order 42: PartialFill qty=10",
        "Received Bid @ 101.5",
        "Ask 1 crossed: TotalFill",
        "Heartbeat tick",
    ] {
        let both = fills.decide(message).is_accept() && orders.decide(message).is_accept();
        let has_fill = message.contains("PartialFill") || message.contains("TotalFill");
        let has_order = message.contains("Ask") || message.contains("Bid");
        assert_eq!(both, has_fill && has_order, "message: {message:?}");
    }
}

// =============================================================================
// File routing
// =============================================================================

/// Routing the fixture log with built-in categories.
#[test]
fn e2e_routes_fixture_log() {
    let router = builtin_router();
    let lines = fixture_lines("market_sim.log");
    assert_eq!(lines.len(), 10);

    let routed = router.route_lines(&lines, 1);
    let numbers: Vec<u64> = routed.iter().map(|r| r.line_number).collect();
    assert_eq!(numbers, [2, 3, 4, 6, 7]);

    let summary = router.summarise(&routed, lines.len() as u64);
    assert_eq!(summary.total, 10);
    assert_eq!(summary.unmatched, 5);
    assert_eq!(summary.per_category["fills"], 2);
    assert_eq!(summary.per_category["orders"], 3);

    let mut buf = Vec::new();
    output::write_routed(&mut buf, "market_sim.log", &routed, OutputFormat::Text).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("market_sim.log:4 [fills] "));
    assert!(!text.contains("Heartbeat"));
}

/// A user category directory adds categories next to the built-ins.
#[test]
fn e2e_user_category_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(fixture("rejects.toml"), dir.path().join("rejects.toml")).unwrap();

    let (categories, errors) = load_all_categories(Some(dir.path()), &[]);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    let router = CategoryRouter::new(categories)
        .unwrap()
        .select(&["rejects".to_string()])
        .unwrap();
    let lines = fixture_lines("market_sim.log");
    let routed = router.route_lines(&lines, 1);
    assert_eq!(routed.len(), 1);
    assert_eq!(routed[0].line_number, 9);
    assert_eq!(routed[0].categories, ["rejects"]);
}

/// Inline categories from config.toml take part in loading.
#[test]
fn e2e_inline_category_from_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        r#"
[categories]
enabled = ["session"]

[[category]]
name = "session"
markers = ["Session open", "Session close"]
"#,
    )
    .unwrap();

    let (cfg, warnings) = config::load_config(dir.path()).unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

    let (categories, errors) = load_all_categories(None, &cfg.inline_categories);
    assert!(errors.is_empty());
    let router = CategoryRouter::new(categories)
        .unwrap()
        .select(&cfg.enabled_categories)
        .unwrap();

    let lines = fixture_lines("market_sim.log");
    let numbers: Vec<u64> = router
        .route_lines(&lines, 1)
        .iter()
        .map(|r| r.line_number)
        .collect();
    assert_eq!(numbers, [1, 10]);
}

/// A category file with no markers is reported, not silently accepted.
#[test]
fn e2e_invalid_category_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("empty.toml"),
        "[category]\nname = \"empty\"\nmarkers = []\n",
    )
    .unwrap();

    let (_, errors) = load_all_categories(Some(dir.path()), &[]);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("has no markers"));
}

/// Streaming a file in small chunks gives the same lines, numbers, and
/// counts as routing it in one batch.
#[test]
fn e2e_streamed_file_matches_batch_routing() {
    let router = builtin_router();
    let lines = fixture_lines("market_sim.log");
    let batch = router.route_lines(&lines, 1);
    let mut expected = Vec::new();
    output::write_routed(&mut expected, "market_sim.log", &batch, OutputFormat::Text).unwrap();

    for chunk_lines in [1, 2, 3, 4] {
        let file = fs::File::open(fixture("market_sim.log")).unwrap();
        let mut out = Vec::new();
        let options = RouteOptions {
            chunk_lines,
            ..Default::default()
        };
        let summary = route_stream(&router, file, "market_sim.log", &mut out, options).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            String::from_utf8(expected.clone()).unwrap(),
            "chunk_lines = {chunk_lines}"
        );
        assert_eq!(summary, router.summarise(&batch, lines.len() as u64));
    }
}

/// `--define` style categories are applied over built-ins and files.
#[test]
fn e2e_define_overrides_builtin() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(fixture("rejects.toml"), dir.path().join("rejects.toml")).unwrap();

    let defines = vec!["orders=Ask".to_string()];
    let categories = load_for_routing(Some(dir.path()), &[], &defines).unwrap();
    let router = CategoryRouter::new(categories)
        .unwrap()
        .select(&["orders".to_string()])
        .unwrap();

    let lines = fixture_lines("market_sim.log");
    let numbers: Vec<u64> = router
        .route_lines(&lines, 1)
        .iter()
        .map(|r| r.line_number)
        .collect();
    // Built-in orders would also take the Bid lines 3 and 6.
    assert_eq!(numbers, [2]);
}

/// A malformed `--define` rejects the run with the configuration exit code.
#[test]
fn e2e_bad_define_rejected() {
    let defines = vec!["rejects=Reject,".to_string()];
    let err = load_for_routing(None, &[], &defines).unwrap_err();
    assert!(matches!(
        err,
        LogRouteError::Category(CategoryError::EmptyMarker { index: 1, .. })
    ));
    assert_eq!(err.exit_code(), constants::EXIT_CONFIG_FAILURE);
}

/// An unparseable config.toml maps to the configuration exit code; a
/// missing input file maps to the I/O exit code.
#[test]
fn e2e_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "[categories\n").unwrap();
    let err: LogRouteError = config::load_config(dir.path()).unwrap_err().into();
    assert_eq!(err.exit_code(), constants::EXIT_CONFIG_FAILURE);

    let err = LogRouteError::Io {
        path: dir.path().join("missing.log"),
        operation: "open",
        source: fs::File::open(dir.path().join("missing.log")).unwrap_err(),
    };
    assert_eq!(err.exit_code(), constants::EXIT_IO_FAILURE);
}

// =============================================================================
// Tracing integration
// =============================================================================

/// Each category layer receives only its own events; other layers are
/// unaffected by a category's DENY.
#[test]
fn e2e_tracing_routes_events_per_category() {
    let router = builtin_router();
    let captures: Arc<Mutex<HashMap<String, Capture>>> = Arc::default();

    let layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = {
        let captures = Arc::clone(&captures);
        router_layers(&router, move |name| {
            let capture = Capture::default();
            captures
                .lock()
                .unwrap()
                .insert(name.to_string(), capture.clone());
            capture
        })
    };

    let everything = Capture::default();
    let subscriber = tracing_subscriber::registry()
        .with(layers)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(everything.clone())
                .with_ansi(false),
        );

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("Order 42: PartialFill qty=10");
        tracing::info!("Received Bid @ 101.5");
        tracing::info!("Bid 7 hit: TotalFill qty=2");
        tracing::debug!("Heartbeat tick");
    });

    let captures = captures.lock().unwrap();
    let fills = captures["fills"].lines();
    let orders = captures["orders"].lines();

    assert_eq!(fills.len(), 2);
    assert!(fills[0].ends_with("Order 42: PartialFill qty=10"));
    assert!(fills[1].ends_with("Bid 7 hit: TotalFill qty=2"));

    assert_eq!(orders.len(), 2);
    assert!(orders[0].ends_with("Received Bid @ 101.5"));

    assert_eq!(everything.lines().len(), 4);
}

/// A single hand-built category layer works with a programmatic category.
#[test]
fn e2e_programmatic_category_layer() {
    let cancels = Arc::new(Category::new("cancels", ["Cancel"]).unwrap());
    let capture = Capture::default();
    let subscriber =
        tracing_subscriber::registry().with(category_layer(cancels, capture.clone()));

    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(order = 9, "Cancel requested");
        tracing::warn!(order = 10, "Amend requested");
    });

    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Cancel requested"));
    assert!(lines[0].contains("order=9"));
}
