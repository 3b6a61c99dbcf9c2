//! Hour loop, interaction graph, outcome classification, and competition
//! for the CT launch simulator.
//!
//! Each simulated hour runs the same pipeline: activation, a batch of
//! original posts from the [`TweetGenerator`], reply/quote threads against
//! the hottest recent tweets, then the state update. When the hour budget
//! runs out (or the token dies) the terminal state is compiled into a
//! [`SimulationResult`](ctsim_types::SimulationResult).
//!
//! The crate assumes no async runtime. Generators may suspend; everything
//! else is synchronous, and every random draw comes from a caller-supplied
//! generator so runs are reproducible.
//!
//! # Modules
//!
//! - [`state`] -- Per-run mutable state.
//! - [`generator`] -- [`TweetGenerator`] seam, [`TemplateGenerator`], and the
//!   engagement roll.
//! - [`interaction`] -- Hot tweet scoring and reply/quote planning.
//! - [`update`] -- Folding an hour's tweets into the state.
//! - [`outcome`] -- Metrics and outcome classification.
//! - [`engine`] -- [`SimulationEngine`] and the hour step.
//! - [`stream`] -- The lazy event stream and [`StopSignal`].
//! - [`competition`] -- [`CompetitionCoordinator`] for 2 to 4 tokens.
//! - [`config`] -- Configuration loading from `ctsim-config.yaml`.
//!
//! [`TweetGenerator`]: generator::TweetGenerator
//! [`TemplateGenerator`]: generator::TemplateGenerator
//! [`SimulationEngine`]: engine::SimulationEngine
//! [`StopSignal`]: stream::StopSignal
//! [`CompetitionCoordinator`]: competition::CompetitionCoordinator

pub mod competition;
pub mod config;
pub mod engine;
pub mod generator;
pub mod interaction;
pub mod outcome;
pub mod state;
pub mod stream;
pub mod update;

pub use competition::{CompetitionCoordinator, CompetitionError};
pub use config::{ConfigError, SimulationConfig, TokenEntry};
pub use engine::{EngineOptions, SimulationEngine};
pub use generator::{Draft, InteractionPlan, TemplateGenerator, TweetGenerator};
pub use outcome::OutcomeNoise;
pub use state::SimulationState;
pub use stream::StopSignal;
