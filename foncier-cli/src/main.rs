use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "foncier")]
#[command(about = "foncier - French real-estate price maps from DVF open data")]
#[command(version)]
#[command(long_about = "
foncier turns the DVF (demandes de valeurs foncières) open-data extract and
the administrative boundary layers into per-level price-per-m2 aggregates
and interactive choropleth maps.

Examples:
  foncier hierarchy --out output/region_dept_commune_map.json
  foncier aggregate --dvf data/dvf.csv.gz --out-dir output
  foncier maps --level department --aggregates-dir output --out-dir output
  foncier run --dvf data/dvf.csv.gz --out-dir output
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the region/department/commune containment tree and export it
    Hierarchy {
        /// Region boundaries (GeoJSON)
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Department boundaries (GeoJSON)
        #[arg(long)]
        departments: Option<PathBuf>,

        /// Commune boundaries (GeoJSON)
        #[arg(long)]
        communes: Option<PathBuf>,

        /// Output JSON file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Aggregate DVF transactions into per-level price-per-m2 tables
    Aggregate {
        /// DVF transactions CSV (optionally .gz)
        #[arg(long)]
        dvf: Option<PathBuf>,

        /// Directory the aggregate JSON tables are written to
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Generate choropleth maps from previously written aggregates
    Maps {
        /// Administrative level to generate maps at
        #[arg(long, default_value = "all")]
        level: LevelArg,

        /// Directory holding the aggregate JSON tables
        #[arg(long)]
        aggregates_dir: Option<PathBuf>,

        /// Directory the map artifacts are written to
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Region boundaries (GeoJSON)
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Department boundaries (GeoJSON)
        #[arg(long)]
        departments: Option<PathBuf>,

        /// Commune boundaries (GeoJSON)
        #[arg(long)]
        communes: Option<PathBuf>,

        /// Restrict maps to one property type (e.g. 'Maison')
        #[arg(long)]
        property_kind: Option<String>,
    },

    /// Run the full pipeline: ingest, hierarchy, aggregate, maps
    Run {
        /// DVF transactions CSV (optionally .gz)
        #[arg(long)]
        dvf: Option<PathBuf>,

        /// Region boundaries (GeoJSON)
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Department boundaries (GeoJSON)
        #[arg(long)]
        departments: Option<PathBuf>,

        /// Commune boundaries (GeoJSON)
        #[arg(long)]
        communes: Option<PathBuf>,

        /// Output directory for aggregates, hierarchy and maps
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Restrict maps to one property type (e.g. 'Maison')
        #[arg(long)]
        property_kind: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelArg {
    Country,
    Region,
    Department,
    All,
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet)?;

    let config = Config::load(cli.config.as_deref())?;

    let threads = cli.threads.unwrap_or(config.general.threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to set thread count")?;

    match cli.command {
        Commands::Hierarchy {
            regions,
            departments,
            communes,
            out,
        } => {
            commands::hierarchy::execute(&config, regions, departments, communes, out)?;
        }

        Commands::Aggregate { dvf, out_dir } => {
            commands::aggregate::execute(&config, dvf, out_dir)?;
        }

        Commands::Maps {
            level,
            aggregates_dir,
            out_dir,
            regions,
            departments,
            communes,
            property_kind,
        } => {
            commands::maps::execute(
                &config,
                level,
                aggregates_dir,
                out_dir,
                regions,
                departments,
                communes,
                property_kind,
            )?;
        }

        Commands::Run {
            dvf,
            regions,
            departments,
            communes,
            out_dir,
            property_kind,
        } => {
            commands::run::execute(
                &config,
                dvf,
                regions,
                departments,
                communes,
                out_dir,
                property_kind,
            )?;
        }
    }

    Ok(())
}
