//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `ctsim-config.yaml` at the project
//! root. Every field has a default, so an empty file is a valid config.
//!
//! `CTSIM_SEED` overrides `simulation.seed` when set.
//!
//! A `tokens:` entry is either a full token or a reference to a catalog
//! preset (`preset: pepe`) with an optional `ticker` and `market_condition`.

use std::path::Path;

use ctsim_agents::presets::{UnknownPreset, preset};
use ctsim_types::{MarketCondition, Token};
use serde::Deserialize;

use crate::engine::EngineOptions;

/// Environment variable that overrides the random seed.
pub const SEED_ENV: &str = "CTSIM_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {value:?} ({source})")]
    Env {
        /// The variable name.
        name: &'static str,
        /// The raw value.
        value: String,
        /// Why it did not parse.
        source: std::num::ParseIntError,
    },

    /// A `tokens:` entry names a preset that is not in the catalog.
    #[error("invalid token entry: {source}")]
    Preset {
        /// The failed catalog lookup.
        #[from]
        source: UnknownPreset,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `ctsim-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run parameters.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Tokens to simulate. Two to four tokens run as a competition.
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,

    /// Output settings for the engine binary.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file and apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Env`] if `CTSIM_SEED` is not a number.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_seed_override(std::env::var(SEED_ENV).ok())?;
        Ok(config)
    }

    /// Parse configuration from a YAML string, without env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// The configured tokens, with preset references expanded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Preset`] for the first entry naming an unknown
    /// preset.
    pub fn resolve_tokens(&self) -> Result<Vec<Token>, ConfigError> {
        self.tokens.iter().map(TokenEntry::resolve).collect()
    }

    /// Replace the seed with `value` when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if the value is not a `u64`.
    pub fn apply_seed_override(&mut self, value: Option<String>) -> Result<(), ConfigError> {
        if let Some(raw) = value {
            self.simulation.seed = raw.trim().parse().map_err(|source| ConfigError::Env {
                name: SEED_ENV,
                value: raw.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// One `tokens:` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TokenEntry {
    /// A catalog preset, optionally retickered or moved to another regime.
    Preset {
        /// Catalog name, matched case-insensitively.
        preset: String,
        /// Replacement ticker.
        #[serde(default)]
        ticker: Option<String>,
        /// Replacement market regime.
        #[serde(default)]
        market_condition: Option<MarketCondition>,
    },
    /// A fully specified token.
    Inline(Token),
}

impl TokenEntry {
    /// Expand the entry into a token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Preset`] if the preset is unknown.
    pub fn resolve(&self) -> Result<Token, ConfigError> {
        match self {
            Self::Inline(token) => Ok(token.clone()),
            Self::Preset {
                preset: name,
                ticker,
                market_condition,
            } => {
                let token = preset(name, ticker.as_deref())?;
                Ok(match market_condition {
                    Some(market) => token.with_market(*market),
                    None => token,
                })
            }
        }
    }
}

/// Run parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunConfig {
    /// Hour budget, seed hour included.
    #[serde(default = "default_hours")]
    pub hours: u32,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Whether KOLs join the population.
    #[serde(default = "default_true")]
    pub include_kols: bool,

    /// Join only this many randomly chosen KOLs.
    #[serde(default)]
    pub kol_sample: Option<usize>,

    /// Fixed outcome perturbation; seeded from the run when absent.
    #[serde(default)]
    pub outcome_noise: Option<f64>,

    /// Log hour progress at `info`.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            hours: default_hours(),
            seed: default_seed(),
            include_kols: true,
            kol_sample: None,
            outcome_noise: None,
            verbose: false,
        }
    }
}

impl RunConfig {
    /// The engine options this config selects.
    pub const fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            include_kols: self.include_kols,
            kol_sample: self.kol_sample,
            outcome_noise: self.outcome_noise,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Emit the event stream as JSON lines instead of only the result.
    #[serde(default)]
    pub stream: bool,

    /// Print the human-readable summary to stderr.
    #[serde(default)]
    pub summary: bool,
}

const fn default_hours() -> u32 {
    48
}

const fn default_seed() -> u64 {
    42
}

const fn default_true() -> bool {
    true
}
