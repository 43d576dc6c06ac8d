// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS trajectory dataset generator
//!
//! # Usage
//!
//! ```bash
//! # Simulate with default configuration and save the record
//! qubit-os-traj generate --output dataset.json
//!
//! # Open-system dataset with a fixed seed
//! qubit-os-traj generate --dataset-type open --seed 7 -o open.json
//!
//! # Show shapes of a saved record
//! qubit-os-traj inspect dataset.json
//!
//! # Show effective configuration
//! qubit-os-traj config
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qubit_os_trajectories::{
    config::Config, DatasetAssembler, DatasetRecord, DatasetType, Result, RngMode,
    TrajectoryDataset, VERSION,
};

/// QubitOS trajectory dataset generator
#[derive(Parser)]
#[command(name = "qubit-os-traj")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Generate qubit trajectory datasets from closed and open quantum dynamics")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build (or load) a dataset and write its record
    Generate {
        /// Output JSON path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// closed or open
        #[arg(long)]
        dataset_type: Option<DatasetType>,

        /// Master seed
        #[arg(long)]
        seed: Option<u64>,

        /// sequential or per_task
        #[arg(long)]
        rng_mode: Option<RngMode>,
    },

    /// Print shapes of a saved record
    Inspect {
        /// Record path
        path: PathBuf,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // Initialize logging
    init_logging(&config.logging.level, &config.logging.format);

    match cli.command {
        Commands::Generate {
            output,
            dataset_type,
            seed,
            rng_mode,
        } => {
            // Override config with CLI args
            if let Some(kind) = dataset_type {
                config.dataset.dataset_type = kind;
            }
            if let Some(seed) = seed {
                config.random.seed = Some(seed);
            }
            if let Some(mode) = rng_mode {
                config.random.mode = mode;
            }

            let assembler = DatasetAssembler::new(&config)?;
            let dataset = assembler.build(&mut config.random_source())?;
            print_summary(&dataset);

            if let Some(path) = output {
                dataset.save_json(&path)?;
                info!(path = %path.display(), "Dataset record written");
            }
        }

        Commands::Inspect { path } => {
            inspect(&path, config.dataset.stop)?;
        }

        Commands::Config => {
            // Show effective configuration
            println!("{}", config.to_yaml()?);
        }

        Commands::Validate => {
            // Validate configuration
            match config.validate() {
                Ok(()) => {
                    println!("Configuration is valid");
                }
                Err(e) => {
                    eprintln!("Configuration error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn print_summary(dataset: &TrajectoryDataset) {
    println!("system:        {}", dataset.system_size());
    println!("dataset type:  {}", dataset.dataset_type());
    println!("trajectories:  {:?}", dataset.trajectories().shape());
    println!("training:      {:?}", dataset.train_trajectories().shape());
    println!(
        "time range:    [{}, {}] (cutoff {})",
        dataset.time_grid().start(),
        dataset.time_grid().end(),
        dataset.cutoff()
    );
    println!("batches:       {}", dataset.num_batches());
}

fn inspect(path: &Path, cutoff: f64) -> Result<()> {
    let record = DatasetRecord::load_json(path)?;
    println!("trajectories:  {:?}", record.trajectories.shape());
    println!("time_steps:    {}", record.time_steps.len());
    println!("parameters:    {:?}", record.parameters.shape());

    let dataset = TrajectoryDataset::from_record(record, cutoff)?;
    println!("training:      {:?}", dataset.train_trajectories().shape());
    for label in dataset.plot_labels() {
        println!("  {}", label);
    }
    Ok(())
}

/// Initialize logging with tracing.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
