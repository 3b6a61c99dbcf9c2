//! Shared type definitions for the CT launch simulator.
//!
//! This crate is the single source of truth for the data model shared by the
//! simulation core, the capability runner and the engine binary. Event and
//! result types flow to `TypeScript` via `ts-rs` for the dashboard that
//! consumes the stream.
//!
//! # Modules
//!
//! - [`ids`] -- Run-local tweet identifiers
//! - [`enums`] -- Persona archetypes, market regimes, interaction kinds, outcomes
//! - [`structs`] -- Personas, tokens, tweets and compiled results
//! - [`events`] -- The ordered event schema of a streaming run

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

pub use enums::{InteractionKind, MarketCondition, MemeStyle, PersonaType, PredictedOutcome};
pub use events::{ProgressEvent, SimulationEvent, TweetEvent};
pub use ids::TweetId;
pub use structs::{MAX_THREAD_DEPTH, Persona, SimulationResult, Token, Tweet};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::enums::PersonaType::export_all();
        let _ = crate::enums::MarketCondition::export_all();
        let _ = crate::enums::MemeStyle::export_all();
        let _ = crate::enums::InteractionKind::export_all();
        let _ = crate::enums::PredictedOutcome::export_all();

        let _ = crate::structs::Persona::export_all();
        let _ = crate::structs::Token::export_all();
        let _ = crate::structs::SimulationResult::export_all();

        let _ = crate::events::SimulationEvent::export_all();
        let _ = crate::events::TweetEvent::export_all();
        let _ = crate::events::ProgressEvent::export_all();
    }
}
