//! curbalign - Main Entry Point
//!
//! Batch CLI that aligns DC curb and mobility datasets to census tracts.

use clap::{Parser, Subcommand};
use curbalign::config::PipelineConfig;
use curbalign::layers::loader::load_layer;
use curbalign::observability::init_default_logging;
use curbalign::pipeline::Pipeline;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

/// Tract alignment for DC parking, transit, and traffic data
#[derive(Parser)]
#[command(name = "curbalign")]
#[command(about = "Aligns DC curb and mobility datasets to census tracts")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full alignment pipeline
    Run,
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Print feature counts and geometry types for each configured dataset
    Inspect,
}

fn main() {
    let cli = Cli::parse();

    init_default_logging();

    info!("curbalign v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Run => run_pipeline(config),
        Commands::Config { show } => handle_config_command(config, show),
        Commands::Inspect => inspect_datasets(config),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Ok(PipelineConfig::load_from_file(path)?)
        }
        None => {
            let default_paths = vec!["curbalign.toml", "config/curbalign.toml"];

            for path_str in default_paths {
                let path = PathBuf::from(path_str);
                if path.exists() {
                    info!("Loading configuration from: {}", path.display());
                    return Ok(PipelineConfig::load_from_file(&path)?);
                }
            }

            error!(
                "No configuration file found. Provide one with -c/--config or create curbalign.toml"
            );
            process::exit(1);
        }
    }
}

fn run_pipeline(config: PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = Pipeline::new(config).run()?;
    info!(
        run_id = %outcome.report.run_id,
        tracts = outcome.metrics.len(),
        "pipeline finished"
    );
    Ok(())
}

fn handle_config_command(
    config: PipelineConfig,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("Current configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
    }

    info!("Configuration validation complete");
    Ok(())
}

fn inspect_datasets(config: PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut datasets = vec![
        ("boundary", Some(config.datasets.boundary.clone())),
        ("census_tracts", Some(config.datasets.census_tracts.clone())),
        ("parking_zones", config.datasets.parking_zones.clone()),
        ("traffic", config.datasets.traffic.clone()),
        ("transit", config.datasets.transit.clone()),
    ];

    for (name, path) in datasets.drain(..) {
        let Some(path) = path else { continue };
        let loaded = load_layer(&path, name)?;
        println!("{name} ({}):", path.display());
        println!("  features: {}", loaded.layer.len());
        println!("  crs: EPSG:{}", loaded.layer.crs.epsg());
        println!("  dropped: {}", loaded.stats.total_dropped());
        for (geometry_type, count) in loaded.layer.geometry_type_counts() {
            println!("  {geometry_type}: {count}");
        }
    }

    Ok(())
}
