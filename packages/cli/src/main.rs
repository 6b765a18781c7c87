#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the aquastock calculator.
//!
//! Species data and compatibility judgments come from the hosted services
//! configured through `AQUASTOCK_*` environment variables, or from local
//! JSON files passed with `--species-catalog` and `--judgments`.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use aquastock_calculator::{
    CalculationRequest, CalculationSession, Calculator, HistoryRecord, ServiceSettings,
};
use aquastock_compatibility::{PairwiseCompatibilityOracle, StaticOracle, create_oracle_from_env};
use aquastock_species::memory::MemorySpeciesSource;
use aquastock_species::{SpeciesDataSource, SpeciesResolver, create_species_source_from_env};
use aquastock_stocking::StockingRules;
use aquastock_tank::format::{dimension_label, format_volume_with_gallons};
use aquastock_tank::{LengthUnit, TankDimensions, TankShape, calculate_volume_liters_with};
use clap::{Parser, Subcommand};

/// Aquarium stocking calculator.
#[derive(Parser)]
#[command(name = "aquastock")]
#[command(about = "Recommend fish quantities for an aquarium")]
struct Cli {
    /// TOML file overriding the built-in stocking rules.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the water volume of a tank.
    Volume {
        #[command(flatten)]
        tank: TankArgs,
    },

    /// Check whether one species suits a tank's shape.
    Fit {
        #[command(flatten)]
        tank: TankArgs,

        /// Common name of the species.
        species: String,

        /// Local species catalog (JSON) instead of the hosted service.
        #[arg(long)]
        species_catalog: Option<PathBuf>,
    },

    /// Run a full calculation for a JSON request file.
    Calculate {
        /// Request file with `dimensions` and `selection`.
        request: PathBuf,

        /// Local species catalog (JSON) instead of the hosted service.
        #[arg(long)]
        species_catalog: Option<PathBuf>,

        /// Local pair judgments (JSON) instead of the hosted oracle.
        #[arg(long)]
        judgments: Option<PathBuf>,

        /// Append a history record (JSON lines) for completed results.
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Print the stocking rules in effect.
    Rules,
}

/// Tank measurements as given on the command line.
#[derive(clap::Args)]
struct TankArgs {
    /// Tank shape: bowl, rectangle, or cylinder.
    #[arg(long, default_value = "rectangle", value_parser = parse_shape)]
    shape: TankShape,

    /// Measurement unit: cm or in.
    #[arg(long, default_value = "cm", value_parser = parse_unit)]
    unit: LengthUnit,

    /// Length (cylinder: height).
    #[arg(long)]
    length: Option<String>,

    /// Width (cylinder: diameter).
    #[arg(long)]
    width: Option<String>,

    /// Height.
    #[arg(long)]
    height: Option<String>,
}

impl TankArgs {
    fn dimensions(&self) -> TankDimensions {
        TankDimensions::from_raw(
            self.shape,
            self.unit,
            self.length.as_deref(),
            self.width.as_deref(),
            self.height.as_deref(),
        )
    }
}

fn parse_shape(raw: &str) -> Result<TankShape, String> {
    raw.parse()
        .map_err(|_| format!("unknown tank shape '{raw}' (expected bowl, rectangle, or cylinder)"))
}

fn parse_unit(raw: &str) -> Result<LengthUnit, String> {
    raw.parse().map_err(|_| format!("unknown unit '{raw}' (expected cm or in)"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let rules = match &cli.rules {
        Some(path) => StockingRules::from_path(path)?,
        None => StockingRules::default(),
    };

    match cli.command {
        Commands::Volume { tank } => {
            let dimensions = tank.dimensions();
            let liters = calculate_volume_liters_with(&dimensions, rules.bowl_volume_liters);
            println!(
                "{} ({})",
                format_volume_with_gallons(liters),
                dimension_label(&dimensions)
            );
        }
        Commands::Fit {
            tank,
            species,
            species_catalog,
        } => {
            let calculator = Calculator::new(
                resolver(species_catalog.as_deref())?,
                Arc::new(StaticOracle::default()),
                rules,
            )
            .with_settings(ServiceSettings::from_env());
            match calculator.check_species_fit(&tank.dimensions(), &species).await {
                Some(flag) => println!("{}", flag.reason),
                None => println!("{species} suits this tank."),
            }
        }
        Commands::Calculate {
            request,
            species_catalog,
            judgments,
            history,
        } => {
            let calculator = Calculator::new(
                resolver(species_catalog.as_deref())?,
                oracle(judgments.as_deref())?,
                rules,
            )
            .with_settings(ServiceSettings::from_env());
            calculate(CalculationSession::new(calculator), &request, history.as_deref()).await?;
        }
        Commands::Rules => print!("{}", rules.to_toml_string()?),
    }

    Ok(())
}

async fn calculate(
    session: CalculationSession,
    request_path: &Path,
    history_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let input: CalculationRequest = serde_json::from_str(&std::fs::read_to_string(request_path)?)?;
    let request = session.begin(input.dimensions, input.selection);

    let outcome = match session.run(&request).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => return Ok(()),
        Err(e) => {
            if e.is_retryable() {
                log::error!("{e} (retry later)");
            }
            return Err(e.into());
        }
    };

    log::info!("{}", outcome.summary());
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let (Some(path), Some(result)) = (history_path, outcome.completed()) {
        let record = HistoryRecord::from_result(result);
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", serde_json::to_string(&record)?)?;
        log::debug!("Appended history record to {}", path.display());
    }

    Ok(())
}

fn resolver(catalog: Option<&Path>) -> Result<SpeciesResolver, Box<dyn std::error::Error>> {
    let source: Arc<dyn SpeciesDataSource> = match catalog {
        Some(path) => Arc::new(MemorySpeciesSource::from_path(path)?),
        None => Arc::from(create_species_source_from_env()?),
    };
    Ok(SpeciesResolver::new(source))
}

fn oracle(
    judgments: Option<&Path>,
) -> Result<Arc<dyn PairwiseCompatibilityOracle>, Box<dyn std::error::Error>> {
    Ok(match judgments {
        Some(path) => Arc::new(StaticOracle::from_path(path)?),
        None => Arc::from(create_oracle_from_env()?),
    })
}
