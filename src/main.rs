//! weatherlens - weather dataset analysis and charts
//!
//! A CLI tool that loads a daily weather CSV, prints descriptive
//! statistics and renders two chart panels as PNG files.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Input missing, malformed data or any other runtime error

mod analysis;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod render;
mod report;

use anyhow::Context;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use loader::LoadOptions;
use models::WeatherSummary;
use render::{ChartRenderer, PlottersRenderer};
use report::ReportOptions;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("{}", e.diagnostic());
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("weatherlens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the analysis
    if let Err(e) = run_analysis(&args) {
        debug!("{} failure: {:#}", e.kind(), e);
        eprintln!("{}", e.diagnostic());
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .weatherlens.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize the input, report layout and chart style.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so the report on stdout stays clean.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete load, report and render workflow.
fn run_analysis(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(args)?;
    config.merge_with_args(args);
    config.validate()?;

    // Step 1: Load the dataset
    let input = config.general.input.clone();
    info!("Loading {}", input.display());
    let table = loader::load_table(&input, &LoadOptions::from(&config.loader))?;

    // Step 2: Aggregate
    let summary = WeatherSummary::from_table(&table);
    let aggregation = analysis::Aggregation::compute(&table);
    debug!(
        "{} of 12 months have temperature data",
        aggregation.monthly_mean_temperature.present().len()
    );

    // Step 3: Report
    let options = ReportOptions {
        title: config.general.title.clone(),
        head_rows: config.report.head_rows,
        tail_rows: config.report.tail_rows,
        display_width: config.report.display_width,
    };

    let text = args.format == OutputFormat::Text;
    if text {
        print!("{}", report::generate_text_report(&table, &summary, &options));
    }

    // Step 4: Charts
    let files = if config.charts.enabled {
        if text {
            print!("{}", report::generate_section_heading("CREATING VISUALIZATIONS"));
        }

        let renderer = PlottersRenderer::new(
            config.charts.style.clone(),
            &config.general.title,
            &config.charts.main_file,
            &config.charts.additional_file,
        );
        let written = render_charts(
            &renderer,
            &table,
            &aggregation,
            &config.general.output_dir,
            args,
        )?;

        if text {
            println!("Saved {} chart files.", written.len());
        }
        written
    } else {
        info!("Chart rendering disabled");
        Vec::new()
    };
    let files: Vec<PathBuf> = files.iter().map(|f| display_path(f)).collect();

    if text {
        print!("{}", report::generate_completion_banner(&files));
    } else {
        let json =
            report::generate_json_report(&table, &summary, &aggregation, &files, &options)?;
        println!("{}", json);
    }

    info!(
        "Analysis finished in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Render both figures behind a spinner and write them out.
fn render_charts(
    renderer: &dyn ChartRenderer,
    table: &models::WeatherTable,
    aggregation: &analysis::Aggregation,
    output_dir: &Path,
    args: &Args,
) -> Result<Vec<PathBuf>> {
    let spinner = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };
    spinner.set_message("Rendering charts...");

    let result = render::create_visualizations(renderer, table, aggregation, output_dir);
    spinner.finish_and_clear();

    Ok(result?)
}

/// Path as shown to the user, without a leading `./`.
fn display_path(path: &Path) -> PathBuf {
    path.strip_prefix(".").unwrap_or(path).to_path_buf()
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Ok(Config::load(config_path)?);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_path_strips_current_dir() {
        let path = Path::new(".").join("weather_analysis_main.png");
        assert_eq!(display_path(&path), PathBuf::from("weather_analysis_main.png"));
        assert_eq!(
            display_path(Path::new("charts/a.png")),
            PathBuf::from("charts/a.png")
        );
    }
}
