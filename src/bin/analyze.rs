// Lab analysis from the command line
//
// Usage: cargo run --bin analyze -- <lab_data.json> <soil|leaf>
//
// Prints the analysis outcome as pretty JSON on stdout; logs go to stderr.
// Exits with status 1 when the analysis did not succeed.

use anyhow::{Context, Result};
use nutrient_analyzer_rust::{AnalysisOrchestrator, EngineConstants, StandardRegistry};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "nutrient_analyzer_rust=info,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <lab_data.json> <soil|leaf>", args[0]);
        std::process::exit(2);
    }
    let lab_path = PathBuf::from(&args[1]);
    let report_type = &args[2];

    // Configuration from environment variables
    let standards_path = std::env::var("STANDARDS_PATH").ok().map(PathBuf::from);
    let constants_path = std::env::var("CONSTANTS_PATH").ok().map(PathBuf::from);

    tracing::info!("Configuration:");
    tracing::info!("  STANDARDS_PATH: {:?}", standards_path);
    tracing::info!("  CONSTANTS_PATH: {:?}", constants_path);

    let custom_registry = standards_path
        .as_deref()
        .map(load_standards)
        .transpose()?;
    let registry = custom_registry.as_ref().unwrap_or_else(|| StandardRegistry::mpob());

    let constants = match constants_path.as_deref() {
        Some(path) => EngineConstants::load(path)?,
        None => EngineConstants::default(),
    };

    let contents = std::fs::read_to_string(&lab_path)
        .with_context(|| format!("Failed to read lab data: {:?}", lab_path))?;
    let lab_data: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse lab data JSON: {:?}", lab_path))?;

    let orchestrator = AnalysisOrchestrator::new(registry, constants);
    let outcome = orchestrator.analyze_json(&lab_data, report_type, None);

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}

/// CSV by extension, JSON otherwise
fn load_standards(path: &Path) -> Result<StandardRegistry> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        StandardRegistry::from_csv_path(path)
    } else {
        StandardRegistry::from_json_path(path)
    }
}
