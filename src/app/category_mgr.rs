// LogRoute - app/category_mgr.rs
//
// Category manager: loads built-in, user-defined, and inline categories.

use crate::core::category::{self, Category, CategoryMeta};
use crate::util::constants;
use crate::util::error::{CategoryError, LogRouteError};
use std::path::Path;

/// Load all available categories: built-in first, then user files, then
/// inline definitions.
///
/// A user or inline category with the same name as an already loaded one
/// replaces it. Invalid definitions are collected as errors; callers decide
/// whether they are fatal (the CLI treats any error as fatal).
///
/// Returns the merged list and every error encountered.
pub fn load_all_categories(
    user_category_dir: Option<&Path>,
    inline: &[CategoryMeta],
) -> (Vec<Category>, Vec<CategoryError>) {
    let mut categories = category::load_builtin_categories();
    let mut errors = Vec::new();

    tracing::info!(builtin_count = categories.len(), "Loaded built-in categories");

    if let Some(dir) = user_category_dir {
        if dir.is_dir() {
            let (user_categories, user_errors) = load_user_categories(dir);
            errors.extend(user_errors);
            for user_category in user_categories {
                merge(&mut categories, user_category, "file");
            }
        } else {
            tracing::debug!(
                dir = %dir.display(),
                "User category directory does not exist (skipping)"
            );
        }
    }

    for meta in inline {
        match category::compile_meta(meta.clone(), false) {
            Ok(c) => merge(&mut categories, c, "config"),
            Err(e) => errors.push(e),
        }
    }

    if categories.len() > constants::MAX_CATEGORIES {
        tracing::warn!(
            count = categories.len(),
            max = constants::MAX_CATEGORIES,
            "Too many categories loaded, truncating"
        );
        errors.push(CategoryError::TooManyCategories {
            count: categories.len(),
            max: constants::MAX_CATEGORIES,
        });
        categories.truncate(constants::MAX_CATEGORIES);
    }

    tracing::info!(total = categories.len(), "Category loading complete");

    (categories, errors)
}

/// Load every category source for a routing run, then apply `defines`
/// (`NAME=MARKER[,MARKER...]`) on top.
///
/// Any invalid definition rejects the whole set. Every error is logged in
/// the order found; a single error is returned as-is, several are returned
/// together.
pub fn load_for_routing(
    user_category_dir: Option<&Path>,
    inline: &[CategoryMeta],
    defines: &[String],
) -> Result<Vec<Category>, LogRouteError> {
    let (mut categories, mut errors) = load_all_categories(user_category_dir, inline);

    for definition in defines {
        match category::parse_inline_definition(definition) {
            Ok(c) => merge(&mut categories, c, "cli"),
            Err(e) => errors.push(e),
        }
    }

    if categories.len() > constants::MAX_CATEGORIES {
        errors.push(CategoryError::TooManyCategories {
            count: categories.len(),
            max: constants::MAX_CATEGORIES,
        });
    }

    if errors.is_empty() {
        return Ok(categories);
    }

    for e in &errors {
        tracing::error!(error = %e, "Invalid category");
    }
    tracing::error!(count = errors.len(), "Category configuration rejected");

    if errors.len() == 1 {
        Err(errors.remove(0).into())
    } else {
        Err(LogRouteError::InvalidCategories(errors))
    }
}

/// Insert `incoming`, replacing any category of the same name in place.
pub fn merge(categories: &mut Vec<Category>, incoming: Category, origin: &'static str) {
    if let Some(pos) = categories.iter().position(|c| c.name() == incoming.name()) {
        tracing::info!(
            category = incoming.name(),
            origin,
            "Category overrides an earlier definition"
        );
        categories[pos] = incoming;
    } else {
        tracing::info!(category = incoming.name(), origin, "Loaded category");
        categories.push(incoming);
    }
}

/// Load user-defined categories from a directory.
///
/// Files are read in name order so overrides are deterministic. Two files
/// in the same directory defining the same name is an error.
fn load_user_categories(dir: &Path) -> (Vec<Category>, Vec<CategoryError>) {
    let mut categories: Vec<Category> = Vec::new();
    let mut errors = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(CategoryError::Io {
                path: dir.to_path_buf(),
                source: e,
            });
            return (categories, errors);
        }
    };

    let mut paths = Vec::new();
    for entry_result in entries {
        match entry_result {
            Ok(entry) => paths.push(entry.path()),
            Err(e) => errors.push(CategoryError::Io {
                path: dir.to_path_buf(),
                source: e,
            }),
        }
    }
    paths.sort();

    for path in paths {
        if path.extension().and_then(|e| e.to_str()) != Some(constants::CATEGORY_FILE_EXTENSION) {
            continue;
        }

        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                errors.push(CategoryError::Io {
                    path: path.clone(),
                    source: e,
                });
                continue;
            }
        };

        if metadata.len() > constants::MAX_CATEGORY_FILE_SIZE {
            errors.push(CategoryError::FileTooLarge {
                path: path.clone(),
                size: metadata.len(),
                max_size: constants::MAX_CATEGORY_FILE_SIZE,
            });
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                errors.push(CategoryError::Io {
                    path: path.clone(),
                    source: e,
                });
                continue;
            }
        };

        match category::parse_category_toml(&content, &path)
            .and_then(|def| category::validate_and_compile(def, &path, false))
        {
            Ok(c) => {
                if categories.iter().any(|existing| existing.name() == c.name()) {
                    errors.push(CategoryError::DuplicateName {
                        name: c.name().to_string(),
                    });
                } else {
                    categories.push(c);
                }
            }
            Err(e) => errors.push(e),
        }
    }

    (categories, errors)
}
