// LogRoute - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// The classification path itself never produces errors; everything here
// belongs to startup (category loading, configuration) or CLI I/O.

use crate::util::constants;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogRoute operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogRouteError {
    /// Category loading or validation failed.
    Category(CategoryError),

    /// Several category definitions were rejected, in the order found.
    InvalidCategories(Vec<CategoryError>),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogRouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(e) => write!(f, "Category error: {e}"),
            Self::InvalidCategories(errors) => {
                write!(f, "{} category errors:", errors.len())?;
                for e in errors {
                    write!(f, "\n  - {e}")?;
                }
                Ok(())
            }
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogRouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Category(e) => Some(e),
            Self::InvalidCategories(errors) => errors
                .first()
                .map(|e| e as &(dyn std::error::Error + 'static)),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl LogRouteError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Category(_) | Self::InvalidCategories(_) | Self::Config(_) => {
                constants::EXIT_CONFIG_FAILURE
            }
            Self::Io { .. } => constants::EXIT_IO_FAILURE,
        }
    }
}

// ---------------------------------------------------------------------------
// Category errors
// ---------------------------------------------------------------------------

/// Errors related to category definition loading and validation.
#[derive(Debug)]
pub enum CategoryError {
    /// TOML file could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Category file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A required field is missing or empty.
    MissingField {
        category: String,
        field: &'static str,
    },

    /// The category name contains characters outside `[A-Za-z0-9_-]`.
    InvalidName { name: String },

    /// The category has no markers at all.
    NoMarkers { category: String },

    /// One of the markers is the empty string.
    EmptyMarker { category: String, index: usize },

    /// Too many markers in one category.
    TooManyMarkers {
        category: String,
        count: usize,
        max: usize,
    },

    /// A marker exceeds the maximum allowed length.
    MarkerTooLong {
        category: String,
        index: usize,
        length: usize,
        max_length: usize,
    },

    /// The combined marker matcher could not be built.
    MatcherBuild {
        category: String,
        source: aho_corasick::BuildError,
    },

    /// An inline `name=marker,marker` definition is malformed.
    InvalidInlineDefinition { definition: String },

    /// Two categories share the same name where that is not allowed.
    DuplicateName { name: String },

    /// A requested category is not loaded.
    UnknownCategory { name: String, available: Vec<String> },

    /// Maximum number of categories exceeded.
    TooManyCategories { count: usize, max: usize },

    /// I/O error reading a category file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for CategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse TOML '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Category file '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::MissingField { category, field } => {
                write!(f, "Category '{category}': missing required field '{field}'")
            }
            Self::InvalidName { name } => write!(
                f,
                "Category name '{name}' is invalid; use letters, digits, '-' or '_'"
            ),
            Self::NoMarkers { category } => {
                write!(f, "Category '{category}' has no markers")
            }
            Self::EmptyMarker { category, index } => {
                write!(f, "Category '{category}': marker #{index} is empty")
            }
            Self::TooManyMarkers {
                category,
                count,
                max,
            } => write!(
                f,
                "Category '{category}' has {count} markers, maximum is {max}"
            ),
            Self::MarkerTooLong {
                category,
                index,
                length,
                max_length,
            } => write!(
                f,
                "Category '{category}': marker #{index} is {length} bytes, \
                 exceeds maximum of {max_length}"
            ),
            Self::MatcherBuild { category, source } => write!(
                f,
                "Category '{category}': failed to build marker matcher: {source}"
            ),
            Self::InvalidInlineDefinition { definition } => write!(
                f,
                "Inline category '{definition}' is malformed; expected NAME=MARKER[,MARKER...]"
            ),
            Self::DuplicateName { name } => {
                write!(f, "Duplicate category name '{name}'")
            }
            Self::UnknownCategory { name, available } => write!(
                f,
                "Unknown category '{name}'. Available: {}",
                available.join(", ")
            ),
            Self::TooManyCategories { count, max } => {
                write!(f, "Too many categories loaded ({count}), maximum is {max}")
            }
            Self::Io { path, source } => {
                write!(
                    f,
                    "I/O error reading category file '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for CategoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::MatcherBuild { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<CategoryError> for LogRouteError {
    fn from(e: CategoryError) -> Self {
        Self::Category(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for LogRouteError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogRoute results.
pub type Result<T> = std::result::Result<T, LogRouteError>;
