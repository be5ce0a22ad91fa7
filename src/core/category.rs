// LogRoute - core/category.rs
//
// Category definition loading, validation, and compilation.
// Core layer: accepts TOML strings, never touches the filesystem.
// I/O is handled by app::category_mgr which feeds content here.

use crate::util::constants;
use crate::util::error::CategoryError;
use aho_corasick::AhoCorasick;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

// =============================================================================
// TOML deserialization structures (raw input)
// =============================================================================

/// Raw TOML category file as deserialized from a .toml file.
/// This is validated and compiled into a `Category` for runtime use.
#[derive(Debug, Deserialize)]
pub struct CategoryDefinition {
    pub category: CategoryMeta,
}

/// The `[category]` table. Also used for inline `[[category]]` entries
/// in config.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryMeta {
    // Missing names and markers are reported by validation, not by serde.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub markers: Vec<String>,
}

// =============================================================================
// Compiled category
// =============================================================================

/// A named classification rule: an event belongs to the category when its
/// message contains at least one marker (case-sensitive, exact substring).
///
/// Immutable after construction. Share it across threads via `Arc`.
#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    description: String,
    markers: Vec<String>,
    is_builtin: bool,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    /// `str::contains` per marker, in order.
    Linear,
    /// One multi-literal automaton over all markers, compiled once.
    Combined(AhoCorasick),
}

impl Category {
    /// Build a category programmatically. Applies the same validation as
    /// category files.
    pub fn new<I, S>(name: &str, markers: I) -> Result<Self, CategoryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers = markers.into_iter().map(Into::into).collect();
        compile(name, String::new(), markers, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Markers in definition order, duplicates removed.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn is_builtin(&self) -> bool {
        self.is_builtin
    }

    /// True if `message` contains any of the markers.
    pub fn matches(&self, message: &str) -> bool {
        match &self.matcher {
            Matcher::Linear => self
                .markers
                .iter()
                .any(|marker| message.contains(marker.as_str())),
            Matcher::Combined(automaton) => automaton.is_match(message),
        }
    }

    /// True when this category uses the combined matcher.
    pub fn uses_combined_matcher(&self) -> bool {
        matches!(self.matcher, Matcher::Combined(_))
    }
}

// =============================================================================
// Category validation and compilation
// =============================================================================

/// Parse a TOML string into a `CategoryDefinition`.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_category_toml(
    toml_content: &str,
    source_path: &Path,
) -> Result<CategoryDefinition, CategoryError> {
    toml::from_str(toml_content).map_err(|e| CategoryError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Validate a `CategoryDefinition` and compile it into a runtime `Category`.
pub fn validate_and_compile(
    def: CategoryDefinition,
    source_path: &Path,
    is_builtin: bool,
) -> Result<Category, CategoryError> {
    let category = compile_meta(def.category, is_builtin)?;
    tracing::debug!(
        category = category.name(),
        source = %source_path.display(),
        markers = category.markers().len(),
        "Compiled category"
    );
    Ok(category)
}

/// Validate and compile an inline `[[category]]` table or CLI definition.
pub fn compile_meta(meta: CategoryMeta, is_builtin: bool) -> Result<Category, CategoryError> {
    compile(&meta.name, meta.description, meta.markers, is_builtin)
}

/// Parse a CLI-style inline definition: `NAME=MARKER[,MARKER...]`.
///
/// The name is trimmed; markers are taken exactly as written.
pub fn parse_inline_definition(definition: &str) -> Result<Category, CategoryError> {
    let (name, markers) =
        definition
            .split_once('=')
            .ok_or_else(|| CategoryError::InvalidInlineDefinition {
                definition: definition.to_string(),
            })?;

    let markers: Vec<String> = markers.split(',').map(str::to_string).collect();
    compile(name.trim(), String::new(), markers, false)
}

/// Validates:
/// - name is present and uses only `[A-Za-z0-9_-]`
/// - at least one marker, at most `MAX_MARKERS_PER_CATEGORY`
/// - no marker is empty or longer than `MAX_MARKER_LENGTH`
fn compile(
    name: &str,
    description: String,
    markers: Vec<String>,
    is_builtin: bool,
) -> Result<Category, CategoryError> {
    if name.trim().is_empty() {
        return Err(CategoryError::MissingField {
            category: "(empty)".to_string(),
            field: "category.name",
        });
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CategoryError::InvalidName {
            name: name.to_string(),
        });
    }

    if markers.is_empty() {
        return Err(CategoryError::NoMarkers {
            category: name.to_string(),
        });
    }
    if markers.len() > constants::MAX_MARKERS_PER_CATEGORY {
        return Err(CategoryError::TooManyMarkers {
            category: name.to_string(),
            count: markers.len(),
            max: constants::MAX_MARKERS_PER_CATEGORY,
        });
    }

    let mut seen = HashSet::with_capacity(markers.len());
    let mut unique = Vec::with_capacity(markers.len());
    for (index, marker) in markers.into_iter().enumerate() {
        if marker.is_empty() {
            return Err(CategoryError::EmptyMarker {
                category: name.to_string(),
                index,
            });
        }
        if marker.len() > constants::MAX_MARKER_LENGTH {
            return Err(CategoryError::MarkerTooLong {
                category: name.to_string(),
                index,
                length: marker.len(),
                max_length: constants::MAX_MARKER_LENGTH,
            });
        }
        if seen.insert(marker.clone()) {
            unique.push(marker);
        } else {
            tracing::debug!(category = name, marker = %marker, "Ignoring duplicate marker");
        }
    }

    let matcher = build_matcher(name, &unique)?;

    Ok(Category {
        name: name.to_string(),
        description,
        markers: unique,
        is_builtin,
        matcher,
    })
}

fn build_matcher(name: &str, markers: &[String]) -> Result<Matcher, CategoryError> {
    if markers.len() <= constants::LINEAR_SCAN_MAX_MARKERS {
        return Ok(Matcher::Linear);
    }

    AhoCorasick::new(markers)
        .map(Matcher::Combined)
        .map_err(|e| CategoryError::MatcherBuild {
            category: name.to_string(),
            source: e,
        })
}

// =============================================================================
// Built-in categories (embedded at compile time)
// =============================================================================

/// Embedded TOML content for built-in categories.
/// Each tuple is (filename, TOML content).
pub fn builtin_category_sources() -> Vec<(&'static str, &'static str)> {
    vec![
        ("fills.toml", include_str!("../../categories/fills.toml")),
        ("orders.toml", include_str!("../../categories/orders.toml")),
    ]
}

/// Load and validate all built-in categories.
///
/// Invalid built-ins are logged and skipped.
pub fn load_builtin_categories() -> Vec<Category> {
    let mut categories = Vec::new();

    for (filename, content) in builtin_category_sources() {
        let path = Path::new("<builtin>").join(filename);
        match parse_category_toml(content, &path)
            .and_then(|def| validate_and_compile(def, &path, true))
        {
            Ok(category) => categories.push(category),
            Err(e) => {
                // Built-in failures are bugs, but we still degrade gracefully
                tracing::error!(file = filename, error = %e, "Failed to load built-in category");
            }
        }
    }

    categories
}

// =============================================================================
// Tests
// =============================================================================
