//! Persona catalog and behavioral model for the CT launch simulator.
//!
//! Everything in this crate is a pure function of its inputs plus an
//! injected random source; nothing here owns simulation state.
//!
//! # Modules
//!
//! - [`registry`] -- The immutable persona catalog (base archetypes + KOLs).
//! - [`presets`] -- Ready-made launch tokens for common meme archetypes.
//! - [`activation`] -- Which personas post in a given hour.
//! - [`templates`] -- Deterministic tweet templates used when no model
//!   output is available.
//! - [`sentiment`] -- Keyword sentiment estimate for free-text tweets.

pub mod activation;
pub mod presets;
pub mod registry;
pub mod sentiment;
pub mod templates;

pub use activation::{activation_rate, select_active};
pub use presets::{Preset, UnknownPreset, list_presets, preset, preset_info};
pub use registry::PersonaRegistry;
pub use sentiment::estimate as estimate_sentiment;
