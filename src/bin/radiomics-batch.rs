//! # Radiomics Batch CLI
//!
//! Re-projects saved extraction results and inspects the effective configuration.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use radiomics_batch::analysis::{FeatureDataset, GroupedProjector, PcaProjector};
use radiomics_batch::config::{BatchConfig, ConfigManager, ConfigurationError};
use radiomics_batch::output::read_csv_table;

#[derive(Parser)]
#[command(name = "radiomics-batch")]
#[command(about = "Project radiomics feature tables and inspect configuration")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment section to apply (development, test, production)
    #[arg(short, long)]
    environment: Option<String>,

    /// Directory containing radiomics-batch.yaml (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project one or more result tables (one per group) with PCA
    Project {
        /// Result CSV files, one per group, in group order
        #[arg(short, long = "table", required = true)]
        tables: Vec<PathBuf>,

        /// Output dimensionality (default: projection.dimensions)
        #[arg(short, long)]
        dimensions: Option<usize>,

        /// Center only, without unit-variance scaling
        #[arg(long)]
        no_scale_variance: bool,

        /// Keep only columns with this prefix (default: extraction.measured_prefix)
        #[arg(long)]
        prefix: Option<String>,

        /// Use every column instead of only the measured ones
        #[arg(long, conflicts_with = "prefix")]
        all_columns: bool,

        /// Write the projection as JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG takes precedence over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let _subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    let result = match &cli.command {
        Commands::Project {
            tables,
            dimensions,
            no_scale_variance,
            prefix,
            all_columns,
            output,
        } => load_config(&cli).and_then(|config| {
            let prefix = if *all_columns {
                None
            } else {
                Some(
                    prefix
                        .clone()
                        .unwrap_or_else(|| config.extraction.measured_prefix.clone()),
                )
            };
            project_tables(
                tables,
                dimensions.unwrap_or(config.projection.dimensions),
                config.projection.scale_variance && !*no_scale_variance,
                prefix.as_deref(),
                output.as_ref(),
            )
        }),
        Commands::Config => show_config(&cli),
    };

    if let Err(e) = result {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// File configuration when present; defaults when no directory was given and none exists
fn load_config(cli: &Cli) -> Result<BatchConfig> {
    let manager = match (&cli.environment, &cli.config_dir) {
        (Some(environment), dir) => {
            ConfigManager::load_from_directory_with_env(dir.clone(), environment)
        }
        (None, dir) => ConfigManager::load_from_directory(dir.clone()),
    };

    match manager {
        Ok(manager) => {
            info!(
                environment = manager.environment(),
                directory = %manager.config_directory().display(),
                "Loaded configuration"
            );
            Ok(manager.config().clone())
        }
        Err(ConfigurationError::ConfigFileNotFound { .. }) if cli.config_dir.is_none() => {
            info!("No configuration file found, using defaults");
            Ok(BatchConfig::default())
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn project_tables(
    paths: &[PathBuf],
    dimensions: usize,
    scale_variance: bool,
    prefix: Option<&str>,
    output: Option<&PathBuf>,
) -> Result<()> {
    if dimensions == 0 {
        bail!("Projection needs at least one output dimension");
    }

    let tables = paths
        .iter()
        .map(|path| {
            read_csv_table(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let feature_tables: Vec<_> = tables
        .iter()
        .map(|table| table.to_feature_table(prefix))
        .collect();

    let dataset = FeatureDataset::standardized(&feature_tables, scale_variance)
        .context("Failed to build feature dataset")?;
    let (samples, features) = dataset.dimensions();
    info!(samples, features, groups = tables.len(), "Projecting dataset");

    let projection = GroupedProjector::new(dimensions)
        .project(&dataset, &PcaProjector::default())
        .context("Projection failed")?;

    let rendered = serde_json::to_string_pretty(&projection)?;
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    config
        .validate()
        .context("Configuration is invalid")?;
    println!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
