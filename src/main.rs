// LogRoute - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading (rejected if unparseable) and logging initialisation
// 3. Category loading (built-in + user-defined + inline), failing loudly
// 4. Routing input lines to categories chunk by chunk

use clap::Parser;
use logroute::app::route::{self, RouteOptions};
use logroute::app::{category_mgr, output};
use logroute::core::category::Category;
use logroute::core::model::RouteSummary;
use logroute::core::router::CategoryRouter;
use logroute::platform::{self, config::PlatformPaths};
use logroute::util::error::LogRouteError;
use logroute::util::{self, constants};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// LogRoute - classify log lines into named categories.
///
/// Each category is a set of marker substrings; a line belongs to every
/// category whose markers it contains. Lines that match nothing are dropped.
#[derive(Parser, Debug)]
#[command(name = "logroute", version, about)]
struct Cli {
    /// Input files (reads stdin if omitted).
    files: Vec<PathBuf>,

    /// Route only these categories (repeatable). Defaults to all loaded.
    #[arg(short = 'c', long = "category")]
    categories: Vec<String>,

    /// Define an extra category as NAME=MARKER[,MARKER...] (repeatable).
    #[arg(short = 'D', long = "define")]
    defines: Vec<String>,

    /// Directory containing user-defined category files.
    #[arg(short = 'p', long = "category-dir")]
    category_dir: Option<PathBuf>,

    /// Configuration directory holding config.toml.
    #[arg(long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// Emit one JSON object per routed line.
    #[arg(long)]
    json: bool,

    /// Print per-category counts instead of the routed lines.
    #[arg(long)]
    count: bool,

    /// List the loaded categories and exit.
    #[arg(long)]
    list: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let paths = match cli.config_dir {
        Some(ref dir) => PlatformPaths::rooted_at(dir),
        None => PlatformPaths::resolve(),
    };
    let loaded = platform::config::load_config(&paths.config_dir);
    let config_level = loaded
        .as_ref()
        .ok()
        .and_then(|(config, _)| config.log_level.clone());

    util::logging::init(cli.debug, config_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "LogRoute starting"
    );

    let result = loaded
        .map_err(LogRouteError::from)
        .and_then(|(config, warnings)| {
            for warning in &warnings {
                tracing::warn!("{warning}");
            }
            run(&cli, &paths, config)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(exit_code = e.exit_code(), "LogRoute failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(
    cli: &Cli,
    paths: &PlatformPaths,
    config: platform::config::AppConfig,
) -> Result<(), LogRouteError> {
    // Category directory: CLI override > config.toml > platform default
    let category_dir = cli
        .category_dir
        .as_deref()
        .or(config.user_category_dir.as_deref())
        .unwrap_or(&paths.user_categories_dir);

    let categories = category_mgr::load_for_routing(
        Some(category_dir),
        &config.inline_categories,
        &cli.defines,
    )?;

    let selection = if cli.categories.is_empty() {
        &config.enabled_categories
    } else {
        &cli.categories
    };
    let router = CategoryRouter::new(categories)?.select(selection)?;

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    if cli.list {
        let listed: Vec<&Category> = router.filters().iter().map(|f| f.category()).collect();
        output::write_category_list(&mut out, &listed).map_err(route::output_error)?;
        return out.flush().map_err(route::output_error);
    }

    if router.is_empty() {
        tracing::warn!("No categories selected; every line will be dropped");
    }

    tracing::info!(
        categories = ?router.names().collect::<Vec<_>>(),
        inputs = cli.files.len(),
        "Routing"
    );

    let format = if cli.json {
        output::OutputFormat::JsonLines
    } else {
        output::OutputFormat::Text
    };
    let options = RouteOptions {
        format,
        emit_lines: !cli.count,
        ..Default::default()
    };

    let mut summary = router.summarise(&[], 0);

    if cli.files.is_empty() {
        let stdin = io::stdin().lock();
        summary.absorb(route::route_stream(&router, stdin, "-", &mut out, options)?);
    }
    for path in &cli.files {
        summary.absorb(route_file(&router, path, &mut out, options)?);
    }

    if cli.count {
        output::write_summary(&mut out, &summary, format).map_err(route::output_error)?;
    }

    out.flush().map_err(route::output_error)
}

fn route_file<W: Write>(
    router: &CategoryRouter,
    path: &Path,
    out: &mut W,
    options: RouteOptions,
) -> Result<RouteSummary, LogRouteError> {
    let file = std::fs::File::open(path).map_err(|e| LogRouteError::Io {
        path: path.to_path_buf(),
        operation: "open",
        source: e,
    })?;
    route::route_stream(router, file, &path.display().to_string(), out, options)
}
