//! Command-line driver for the CT launch simulator.
//!
//! Loads `ctsim-config.yaml` (or the file named by `CTSIM_CONFIG`), then:
//!
//! - one token: runs a simulation and prints the result as JSON, or the full
//!   event stream as JSON lines when `output.stream` is set
//! - two to four tokens: runs a competition and prints one result per line
//!
//! `output.summary` adds the human-readable report on stderr. Tweet text
//! comes from the persona templates; no model is called.

mod error;

use std::path::{Path, PathBuf};
use std::pin::pin;

use ctsim_agents::{PersonaRegistry, list_presets};
use ctsim_core::competition::analyze;
use ctsim_core::config::SEED_ENV;
use ctsim_core::{
    CompetitionCoordinator, SimulationConfig, SimulationEngine, StopSignal, TemplateGenerator,
};
use ctsim_types::{MarketCondition, SimulationEvent, SimulationResult, Token};
use futures::StreamExt;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "CTSIM_CONFIG";

/// Config file used when `CTSIM_CONFIG` is unset.
const DEFAULT_CONFIG: &str = "ctsim-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the token list cannot
/// form a competition, or output cannot be serialized.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("ctsim-engine starting");

    let config = load_config()?;
    let configured = config.resolve_tokens().map_err(EngineError::from)?;
    let tokens = if configured.is_empty() {
        info!(
            presets = %list_presets().join(", "),
            "No tokens configured, simulating the demo token"
        );
        vec![demo_token()]
    } else {
        configured
    };
    info!(
        hours = config.simulation.hours,
        seed = config.simulation.seed,
        tokens = tokens.len(),
        include_kols = config.simulation.include_kols,
        "Configuration loaded"
    );

    let registry = PersonaRegistry::builtin();
    let engine = SimulationEngine::new(&registry, TemplateGenerator::new())
        .with_options(config.simulation.engine_options());
    let mut rng = SmallRng::seed_from_u64(config.simulation.seed);

    match tokens.as_slice() {
        [token] if config.output.stream => {
            stream_single(&engine, token, &config, rng).await?;
        }
        [token] => {
            let result = engine
                .run(token, config.simulation.hours, config.simulation.verbose, &mut rng)
                .await;
            emit(&result, config.output.summary)?;
        }
        field => {
            if config.output.stream {
                warn!("output.stream applies to single runs only; competition prints results");
            }
            let results = CompetitionCoordinator::new(&engine)
                .run(field, config.simulation.hours, &mut rng)
                .await
                .map_err(EngineError::from)?;
            for result in &results {
                emit(result, config.output.summary)?;
            }
            if config.output.summary {
                eprintln!("{}", analyze(&results));
            }
        }
    }

    info!("ctsim-engine finished");
    Ok(())
}

/// Stream one run as JSON lines, stopping cleanly on Ctrl-C.
async fn stream_single(
    engine: &SimulationEngine<'_, TemplateGenerator>,
    token: &Token,
    config: &SimulationConfig,
    rng: SmallRng,
) -> Result<(), EngineError> {
    let stop = StopSignal::new();
    let on_interrupt = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current hour");
            on_interrupt.stop();
        }
    });

    let mut events = pin!(engine.run_stream(token, config.simulation.hours, stop, rng));
    while let Some(event) = events.next().await {
        println!("{}", serde_json::to_string(&event)?);
        if let SimulationEvent::Result { result } = &event
            && config.output.summary
        {
            eprintln!("{result}");
        }
    }
    Ok(())
}

/// Print a result as one JSON line, plus the report when asked.
fn emit(result: &SimulationResult, summary: bool) -> Result<(), EngineError> {
    println!("{}", serde_json::to_string(result)?);
    if summary {
        eprintln!("{result}\n");
    }
    Ok(())
}

/// Load configuration from `CTSIM_CONFIG` or `ctsim-config.yaml`.
///
/// Missing files fall back to defaults; `CTSIM_SEED` applies either way.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let path = config_path(std::env::var(CONFIG_ENV).ok());
    if path.exists() {
        info!(path = %path.display(), "Loading configuration");
        Ok(SimulationConfig::from_file(&path)?)
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
        let mut config = SimulationConfig::default();
        config.apply_seed_override(std::env::var(SEED_ENV).ok())?;
        Ok(config)
    }
}

fn config_path(from_env: Option<String>) -> PathBuf {
    from_env
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| Path::new(DEFAULT_CONFIG).to_path_buf(), PathBuf::from)
}

/// Token simulated when the config names none.
fn demo_token() -> Token {
    let mut token = Token::new(
        "Pepe Classic",
        "PEPEC",
        "The original frog returns to reclaim his throne",
    )
    .with_market(MarketCondition::Bull);
    token.tagline = Some("Feels good man".to_owned());
    token.competing_narratives = vec!["AI agents".to_owned(), "restaking".to_owned()];
    token
}
