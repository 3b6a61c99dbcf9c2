//! Capability-backed tweet generation for the CT launch simulator.
//!
//! The core only knows the [`ctsim_core::TweetGenerator`] seam. This crate
//! implements it on top of an external [`TweetBatchCapability`]: prompts are
//! rendered with `minijinja`, the raw response is parsed best-effort, and
//! every gap is filled from the persona templates. A capability failure of
//! any kind degrades one hour's text, never the run.
//!
//! # Modules
//!
//! - [`capability`] -- The capability trait, request shapes and the deadline decorator
//! - [`config`] -- Environment-driven runner settings
//! - [`error`] -- Capability and runner error types
//! - [`generator`] -- [`CapabilityGenerator`], the seam implementation
//! - [`parse`] -- Best-effort recovery of records from raw responses
//! - [`prompt`] -- Prompt templates and rendering

pub mod capability;
pub mod config;
pub mod error;
pub mod generator;
pub mod parse;
pub mod prompt;

pub use capability::{
    InteractionRequest, InteractionSpec, PersonaSpec, TimeoutCapability, TweetBatchCapability,
    TweetRequest,
};
pub use config::CapabilityConfig;
pub use error::{CapabilityError, RunnerError};
pub use generator::CapabilityGenerator;
pub use parse::{ParsedRecord, parse_records};
pub use prompt::PromptEngine;
