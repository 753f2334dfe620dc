//! SoilSync - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use serde_json::{Map, Value};
use soilsync::{
    audit,
    cli::{Args, Commands, RecommendArgs},
    config::Config,
    predictor::{HttpPredictor, PredictorClient},
    types::PredictionOutcome,
    validation::validate_request,
};
use std::time::Duration;

/// How long the CLI waits for the audit write before exiting
const AUDIT_FLUSH_LIMIT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.clone())?;
    if let Some(endpoint) = &args.endpoint {
        config.predictor.endpoint = endpoint.clone();
        config.validate()?;
    }

    soilsync::logging::init(args.verbosity().log_level(&config.logging.level));

    match &args.command {
        Commands::Recommend(rec) => {
            run_recommend(&config, rec).await?;
        }
        Commands::Health => {
            check_health(&config).await?;
        }
        Commands::ModelInfo => {
            show_model_info(&config).await?;
        }
        Commands::Config { init } => {
            show_config(&config, *init)?;
        }
    }

    Ok(())
}

async fn run_recommend(config: &Config, rec: &RecommendArgs) -> Result<()> {
    let mut body = match &rec.input {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {:?}", path))?;
            match serde_json::from_str::<Value>(&text).context("Input file is not valid JSON")? {
                Value::Object(map) => map,
                _ => anyhow::bail!("Input file must contain a JSON object"),
            }
        }
        None => Map::new(),
    };
    rec.soil.merge_into(&mut body);

    let input = match validate_request(&Value::Object(body)) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("{} {}", "Invalid input:".red().bold(), e);
            std::process::exit(2);
        }
    };

    let mut config = config.clone();
    if rec.offline {
        config.predictor.enabled = false;
    }
    if rec.deterministic {
        config.engine.deterministic = true;
    }
    if rec.seed.is_some() {
        config.engine.seed = rec.seed;
    }

    let client = PredictorClient::from_config(&config)?;
    let (outcome, pending_audit) = client.predict_tracked(&input).await;

    if rec.json {
        println!("{}", serde_json::to_string_pretty(&outcome.recommendation)?);
    } else {
        print_outcome(&outcome);
    }

    audit::flush(pending_audit, AUDIT_FLUSH_LIMIT).await;

    Ok(())
}

fn print_outcome(outcome: &PredictionOutcome) {
    let rec = &outcome.recommendation;

    println!();
    println!("{}", "Fertilizer Recommendation".bold());
    println!("─────────────────────────────────────");
    println!("Fertilizer:        {}", rec.fertilizer.green().bold());
    println!("Application rate:  {} kg/ha", rec.application_rate);
    println!("Confidence:        {:.1}%", rec.confidence_score);
    println!("Yield increase:    +{}%", rec.expected_yield_increase);
    println!("Model:             {}", rec.model_version);
    println!("Prediction ID:     {}", rec.prediction_id.dimmed());

    if let Some(reason) = outcome.fallback_reason() {
        println!("{} {}", "Remote model unavailable:".yellow(), reason.dimmed());
    }
    println!();
}

async fn check_health(config: &Config) -> Result<()> {
    let predictor = HttpPredictor::new(&config.predictor)?;

    if predictor.health_check().await? {
        println!("{} {}", "✓".green(), format!("Model server healthy at {}", predictor.base_url()));
    } else {
        println!(
            "{} {}",
            "✗".red(),
            format!("Model server unavailable at {} (local engine will be used)", predictor.base_url())
        );
        std::process::exit(1);
    }

    Ok(())
}

async fn show_model_info(config: &Config) -> Result<()> {
    let predictor = HttpPredictor::new(&config.predictor)?;
    let info = predictor.model_info().await?;

    println!("Model loaded:   {}", info.model_loaded);
    println!("Model type:     {}", info.model_type.as_deref().unwrap_or("-"));
    println!("Model version:  {}", info.model_version.as_deref().unwrap_or("-"));
    if !info.feature_names.is_empty() {
        println!("Features:       {}", info.feature_names.join(", "));
    }
    if !info.fertilizer_options.is_empty() {
        println!("Fertilizers:    {}", info.fertilizer_options.join(", "));
    }

    Ok(())
}

fn show_config(config: &Config, init: bool) -> Result<()> {
    println!("Predictor:");
    println!("  Enabled:   {}", config.predictor.enabled);
    println!("  Endpoint:  {}", config.predictor.endpoint);
    println!("  Timeout:   {}ms", config.predictor.timeout_ms);
    println!("  API key:   {}", if config.predictor.api_key.is_some() { "set" } else { "not set" });
    println!();

    println!("Engine:");
    println!("  Deterministic: {}", config.engine.deterministic);
    println!("  Seed:          {}", config.engine.seed.map(|s| s.to_string()).unwrap_or_else(|| "random".to_string()));
    println!();

    println!("Audit:");
    println!("  Sink:  {:?}", config.audit.sink);
    println!("  Path:  {}", config.audit_path().display());
    println!();

    if init {
        let path = Config::default_path().context("Could not determine home directory")?;
        config.save(&path)?;
        println!("{} {}", "Wrote".green(), path.display());
    }

    Ok(())
}
