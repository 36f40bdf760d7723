use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use harvest_volume_estimator::{
    analysis::{Estimator, HarvestEstimate},
    config::EstimatorConfig,
    io, logging,
    models::{parse_date, MeasurementRecord, ProjectionRequest},
    visualization::{
        print_fruits_table, print_measurement_summary, print_statistics_table,
        print_volume_histogram,
    },
};

#[derive(Parser)]
#[command(
    name = "harvest-estimator",
    about = "Harvest Volume Estimator - projects fruit volumes from scan to harvest",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProjectionArgs {
    /// Path to measurement file (CSV, JSON, or Excel)
    #[arg(short, long)]
    input: PathBuf,

    /// Scan date (YYYY-MM-DD)
    #[arg(long)]
    scan_date: String,

    /// Expected harvest date (YYYY-MM-DD)
    #[arg(long)]
    harvest_date: String,

    /// Volume growth per fruit per day (mm³/day)
    #[arg(short = 'r', long)]
    growth_rate: f64,

    /// Smallest scan diameter kept (mm, inclusive)
    #[arg(long)]
    min_diameter: f64,

    /// Largest scan diameter kept (mm, inclusive)
    #[arg(long)]
    max_diameter: f64,

    /// Number of histogram bins [default: from config, 20]
    #[arg(short, long)]
    bins: Option<usize>,

    /// Confidence level for the mean-volume interval (0.0-1.0) [default: from config, 0.95]
    #[arg(short, long)]
    confidence: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Project volumes and show the histogram with summary statistics
    Estimate {
        #[command(flatten)]
        projection: ProjectionArgs,

        /// Write the estimate to a file (.json, .csv histogram, or .xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List every projected fruit inside the diameter window
    Fruits {
        #[command(flatten)]
        projection: ProjectionArgs,

        /// Write the fruit list to a file (.json, .csv, or .xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display a quick summary of a measurement file
    Summary {
        /// Path to measurement file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Start the HTTP API server
    #[cfg(feature = "web")]
    Serve {
        /// Measurement file loaded into the in-memory store
        #[arg(short, long)]
        input: PathBuf,

        /// Address to bind [default: from config, 127.0.0.1]
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on [default: from config, 8080]
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn load_measurements(path: &Path) -> Result<Vec<MeasurementRecord>> {
    let records = io::read_measurements(path)
        .with_context(|| format!("Failed to read measurements from {}", path.display()))?;
    println!(
        "  Loaded {} measurement records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

fn run_estimate(args: &ProjectionArgs, config: &EstimatorConfig) -> Result<HarvestEstimate> {
    let request = ProjectionRequest {
        scan_date: parse_date("scan_date", &args.scan_date)?,
        harvest_date: parse_date("harvest_date", &args.harvest_date)?,
        growth_rate: args.growth_rate,
        min_diameter: args.min_diameter,
        max_diameter: args.max_diameter,
        num_bins: args.bins.unwrap_or(config.histogram.num_bins),
    };
    let confidence = args.confidence.unwrap_or(config.histogram.confidence);

    let records = load_measurements(&args.input)?;
    let estimate = Estimator::new(&records)
        .with_confidence(confidence)
        .estimate(&request)?;
    Ok(estimate)
}

fn write_fruits(estimate: &HarvestEstimate, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => io::write_fruits_csv(&estimate.fruits, path)?,
        "json" => io::write_json(&estimate.fruits, path, true)?,
        "xlsx" => io::write_excel(estimate, path)?,
        _ => anyhow::bail!("Unsupported output format: .{ext}. Use .csv, .json, or .xlsx"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EstimatorConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    logging::init(&config.logging.level);

    match cli.command {
        Commands::Estimate { projection, output } => {
            println!(
                "\n{}",
                format!("Harvest Estimate: {}", projection.input.display())
                    .bold()
                    .cyan()
            );

            let estimate = run_estimate(&projection, &config)?;
            print_statistics_table(&estimate);
            print_volume_histogram(&estimate.histogram);

            if let Some(path) = output {
                io::write_estimate(&estimate, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("{} {}", "Estimate written to".green(), path.display());
            }
        }

        Commands::Fruits { projection, output } => {
            println!(
                "\n{}",
                format!("Projected Fruits: {}", projection.input.display())
                    .bold()
                    .cyan()
            );

            let estimate = run_estimate(&projection, &config)?;
            print_fruits_table(&estimate.fruits);
            println!(
                "\n  {} in window, {} excluded, {} outside window",
                estimate.fruits.len(),
                estimate.excluded_records,
                estimate.filtered_out
            );

            if let Some(path) = output {
                write_fruits(&estimate, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("{} {}", "Fruits written to".green(), path.display());
            }
        }

        Commands::Summary { input } => {
            let records = load_measurements(&input)?;
            print_measurement_summary(&records);
        }

        #[cfg(feature = "web")]
        Commands::Serve { input, host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let store = harvest_volume_estimator::InMemoryStore::from_file(&input)
                .with_context(|| format!("Failed to load {}", input.display()))?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(harvest_volume_estimator::web::start_server(
                Box::new(store),
                config,
            ))?;
        }
    }

    Ok(())
}
