//! Tripbook CLI
//!
//! Console entry point for smoke testing the data path:
//! - Ingest a directory of exports
//! - Add new trips
//! - List and inspect stored trips
//! - Clear or drop the tables

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripbook::{generate_default_config, Config, LoggingConfig, Manager, TripId, TripRepository};

#[derive(Parser)]
#[command(name = "tripbook")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Store and inspect bicycle trip recordings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load exports into an empty database
    Ingest {
        /// Files to load (default: every CSV in the trips directory)
        files: Vec<String>,
    },

    /// Add exports on top of the stored trips
    Add {
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// List stored trips
    List,

    /// Show one trip
    Show {
        /// Trip id
        id: TripId,
    },

    /// Delete every stored trip
    Clear,

    /// Drop the tables
    Drop,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    match cli.command {
        Commands::Ingest { files } => {
            let mut manager = open_manager(&config)?;
            let files = if files.is_empty() {
                manager.available_files()?
            } else {
                files
            };
            let report = manager.bulk_ingest(files.as_slice())?;
            if report.skipped {
                println!("Database already holds trips; use `add` or `clear` first.");
            } else {
                println!(
                    "Ingested {} trips ({} samples)",
                    report.trip_ids.len(),
                    report.samples
                );
            }
        }

        Commands::Add { files } => {
            let mut manager = open_manager(&config)?;
            let report = manager.insert_trips(files.as_slice())?;
            println!(
                "Added trips {:?} ({} samples)",
                report.trip_ids, report.samples
            );
        }

        Commands::List => {
            let manager = open_manager(&config)?;
            let trips = manager.store().list_trips()?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&trips)?);
            } else if trips.is_empty() {
                println!("No trips stored yet.");
            } else {
                println!("{:<6} {:<10} {}", "ID", "Time", "Name");
                println!("{}", "-".repeat(50));
                for trip in trips {
                    println!(
                        "{:<6} {:<10} {}",
                        trip.id,
                        trip.total_time.format("%H:%M:%S").to_string(),
                        trip.name
                    );
                }
            }
        }

        Commands::Show { id } => {
            let manager = open_manager(&config)?;
            let summary = manager.trip_summary(id)?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Trip {}: {}", summary.id, summary.name);
                println!("  Total time: {}", summary.total_time);
                println!("  Samples:    {}", summary.samples);
                if let Some(bbox) = summary.bounding_box {
                    println!(
                        "  Bounds:     lat {:.6}..{:.6}, lon {:.6}..{:.6}",
                        bbox.lat_min, bbox.lat_max, bbox.lon_min, bbox.lon_max
                    );
                }
                if let Some((min, max)) = summary.speed_range {
                    println!("  Speed:      {:.1}..{:.1} km/h", min, max);
                }
                if let Some((min, max)) = summary.altitude_range {
                    println!("  Altitude:   {:.1}..{:.1} m", min, max);
                }
            }
        }

        Commands::Clear => {
            let mut manager = open_manager(&config)?;
            manager.clear_all()?;
            println!("All trips deleted.");
        }

        Commands::Drop => {
            let mut manager = open_manager(&config)?;
            manager.store_mut().drop_schema()?;
            println!("Tables dropped.");
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn open_manager(config: &Config) -> anyhow::Result<Manager> {
    Manager::new(config)
        .with_context(|| format!("opening database {}", config.data.database_path))
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("tripbook={}", config.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
