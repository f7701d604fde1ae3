//! Settlement command-line front end
//!
//! Reads a JSON settlement request from the path given as the first argument
//! (or stdin when the argument is `-` or missing) and prints the result as
//! JSON. Set `MAHJONG_CONFIG` to load a TOML config file; otherwise the
//! configuration comes from the environment.

use anyhow::{Context, Result};
use mahjong_settlement::{Config, SettlementEngine, SettlementRequest};
use std::io::Read;

fn main() -> Result<()> {
    // Initialize tracing; logs go to stderr so stdout stays JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match std::env::var("MAHJONG_CONFIG") {
        Ok(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        Err(_) => Config::from_env().context("Failed to load config from environment")?,
    };
    let engine = SettlementEngine::new(&config)?;
    tracing::info!(
        "Starting {} v{} (stake per fan {})",
        config.service_name,
        config.service_version,
        engine.stake_per_fan()
    );

    let input = read_input(std::env::args().nth(1))?;
    let request: SettlementRequest =
        serde_json::from_str(&input).context("Failed to parse settlement request")?;

    let result = engine
        .validate_and_settle(&request)
        .context("Settlement request rejected")?;

    for line in result.render_breakdown() {
        tracing::info!("{}", line);
    }
    for line in result.render_final_amounts() {
        tracing::info!("{}", line);
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn read_input(path: Option<String>) -> Result<String> {
    match path.as_deref() {
        None | Some("-") => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read request from stdin")?;
            Ok(input)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request from {}", path)),
    }
}
