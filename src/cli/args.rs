//! Command-line argument parsing for SoilSync
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// SoilSync - fertilizer recommendations from soil tests
#[derive(Parser, Debug)]
#[command(name = "soilsync")]
#[command(version)]
#[command(about = "Recommend fertilizer type and rate from soil and environment data", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Remote predictor URL (overrides config)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recommend a fertilizer for one field
    Recommend(RecommendArgs),

    /// Check whether the remote model server is healthy
    Health,

    /// Show metadata reported by the remote model server
    ModelInfo,

    /// Display current configuration
    Config {
        /// Write the effective configuration to the default location
        #[arg(long)]
        init: bool,
    },
}

/// Arguments of the `recommend` subcommand
#[derive(ClapArgs, Debug, Default)]
pub struct RecommendArgs {
    /// JSON file with the soil request; flags override its fields
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub soil: SoilArgs,

    /// Skip the remote predictor and use the local engine
    #[arg(long)]
    pub offline: bool,

    /// Disable random variance
    #[arg(long)]
    pub deterministic: bool,

    /// Seed for reproducible variance
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Soil values given on the command line
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct SoilArgs {
    /// Available phosphorus (ppm)
    #[arg(long)]
    pub phosphorus: Option<f64>,
    /// Exchangeable potassium (ppm)
    #[arg(long)]
    pub potassium: Option<f64>,
    /// Total nitrogen (%)
    #[arg(long)]
    pub nitrogen: Option<f64>,
    /// Organic carbon (%)
    #[arg(long)]
    pub organic_carbon: Option<f64>,
    /// Cation exchange capacity (cmol/kg)
    #[arg(long)]
    pub cation_exchange: Option<f64>,
    #[arg(long)]
    pub sand_percent: Option<f64>,
    #[arg(long)]
    pub clay_percent: Option<f64>,
    #[arg(long)]
    pub silt_percent: Option<f64>,
    /// Mean annual rainfall (mm)
    #[arg(long)]
    pub rainfall: Option<f64>,
    /// Elevation (m)
    #[arg(long)]
    pub elevation: Option<f64>,
    /// Crop (maize, rice, beans, potato, cassava, banana, ...)
    #[arg(long)]
    pub crop_type: Option<String>,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Log level for this verbosity, `configured` applies at Normal
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => configured,
            Verbosity::Verbose => "debug",
            Verbosity::VeryVerbose => "trace",
        }
    }
}

impl SoilArgs {
    /// Overlay the given flags onto a request body
    pub fn merge_into(&self, body: &mut Map<String, Value>) {
        let numeric = [
            ("phosphorus", self.phosphorus),
            ("potassium", self.potassium),
            ("nitrogen", self.nitrogen),
            ("organic_carbon", self.organic_carbon),
            ("cation_exchange", self.cation_exchange),
            ("sand_percent", self.sand_percent),
            ("clay_percent", self.clay_percent),
            ("silt_percent", self.silt_percent),
            ("rainfall", self.rainfall),
            ("elevation", self.elevation),
        ];

        for (field, value) in numeric {
            if let Some(v) = value {
                body.insert(field.to_string(), Value::from(v));
            }
        }

        if let Some(crop) = &self.crop_type {
            body.insert("crop_type".to_string(), Value::String(crop.clone()));
        }
    }
}
