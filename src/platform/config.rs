// LogRoute - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::category::CategoryMeta;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogRoute configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logroute/ or %APPDATA%\LogRoute\config\)
    pub config_dir: PathBuf,

    /// User category directory (e.g. ~/.config/logroute/categories/)
    pub user_categories_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let user_categories_dir = config_dir.join(constants::CATEGORIES_DIR_NAME);

            tracing::debug!(
                config = %config_dir.display(),
                categories = %user_categories_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                user_categories_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self::rooted_at(Path::new("."))
        }
    }

    /// Paths rooted at an explicit configuration directory.
    pub fn rooted_at(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            user_categories_dir: config_dir.join(constants::CATEGORIES_DIR_NAME),
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[categories]` section.
    pub categories: CategoriesSection,
    /// `[[category]]` inline definitions.
    pub category: Vec<CategoryMeta>,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[categories]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct CategoriesSection {
    /// Additional category directory.
    pub user_category_directory: Option<String>,
    /// Categories routed when none are named on the command line.
    pub enabled: Option<Vec<String>>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Overrides the platform category directory.
    pub user_category_dir: Option<PathBuf>,

    /// Default category selection (empty = all loaded).
    pub enabled_categories: Vec<String>,

    /// Inline category definitions, validated later with the rest.
    pub inline_categories: Vec<CategoryMeta>,

    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// A file that exists but cannot be read or parsed is a `ConfigError`: the
/// configuration is rejected rather than silently replaced by defaults.
///
/// Inline categories are not validated here; they go through the same
/// fail-loudly path as category files.
pub fn load_config(config_dir: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return Ok((AppConfig::default(), Vec::new()));
    }

    let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
        path: config_path.clone(),
        source: e,
    })?;

    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.clone(),
        source: e,
    })?;

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    Ok(validate(raw, config_dir))
}

/// Validate each field of a parsed config, accumulating warnings.
///
/// A relative `user_category_directory` is resolved against `config_dir`.
pub fn validate(raw: RawConfig, config_dir: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings = Vec::new();
    let mut config = AppConfig {
        inline_categories: raw.category,
        ..Default::default()
    };

    // -- Categories: user_category_directory --
    if let Some(ref dir) = raw.categories.user_category_directory {
        if dir.trim().is_empty() {
            warnings.push(
                "[categories] user_category_directory is empty. Using the default directory."
                    .to_string(),
            );
        } else {
            let path = PathBuf::from(dir);
            config.user_category_dir = Some(if path.is_relative() {
                config_dir.join(path)
            } else {
                path
            });
        }
    }

    // -- Categories: enabled --
    if let Some(enabled) = raw.categories.enabled {
        let (kept, blank): (Vec<String>, Vec<String>) =
            enabled.into_iter().partition(|n| !n.trim().is_empty());
        if !blank.is_empty() {
            warnings.push(format!(
                "[categories] enabled contains {} blank name(s); they were ignored.",
                blank.len()
            ));
        }
        config.enabled_categories = kept;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: {}. Using default ({}).",
                constants::VALID_LOG_LEVELS.join(", "),
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    (config, warnings)
}
