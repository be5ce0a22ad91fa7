// LogRoute - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogRoute";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogRoute";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Category limits
// =============================================================================

/// Maximum number of categories that can be loaded (built-in + user + inline).
pub const MAX_CATEGORIES: usize = 100;

/// Maximum size of a category TOML file in bytes.
pub const MAX_CATEGORY_FILE_SIZE: u64 = 64 * 1024; // 64 KB

/// Maximum number of markers in a single category.
pub const MAX_MARKERS_PER_CATEGORY: usize = 256;

/// Maximum length of a single marker in bytes.
pub const MAX_MARKER_LENGTH: usize = 1_024;

/// Categories with at most this many markers are matched with a plain
/// per-marker substring scan. Larger sets are compiled into one combined
/// literal matcher at construction time.
pub const LINEAR_SCAN_MAX_MARKERS: usize = 8;

/// Maximum number of input lines classified per batch. Output for a batch
/// is written and flushed before the next one is read.
pub const ROUTE_CHUNK_LINES: usize = 1_024;

// =============================================================================
// Tracing integration
// =============================================================================

/// Upper bound on the bytes of a tracing event's message that are rendered
/// for classification. Markers beyond this point are not seen.
pub const MAX_MESSAGE_SCAN_BYTES: usize = 16 * 1024; // 16 KB

/// Initial capacity of the per-event message buffer.
pub const MESSAGE_BUFFER_INITIAL_CAPACITY: usize = 256;

/// Name of the field that carries a tracing event's formatted message.
pub const MESSAGE_FIELD_NAME: &str = "message";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Maximum length of an input line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Process exit codes
// =============================================================================

/// Exit code for input or output failures.
pub const EXIT_IO_FAILURE: u8 = 1;

/// Exit code for rejected categories or configuration.
pub const EXIT_CONFIG_FAILURE: u8 = 2;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// User categories subdirectory name.
pub const CATEGORIES_DIR_NAME: &str = "categories";

/// File extension of category definition files.
pub const CATEGORY_FILE_EXTENSION: &str = "toml";
