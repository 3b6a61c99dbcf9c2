//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type `main` propagates with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ctsim_core::ConfigError,
    },

    /// The configured token list cannot form a competition.
    #[error("competition error: {source}")]
    Competition {
        /// The underlying competition error.
        #[from]
        source: ctsim_core::CompetitionError,
    },

    /// An event or result could not be written as JSON.
    #[error("output error: {source}")]
    Output {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
