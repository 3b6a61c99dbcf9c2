//! Error types for the capability runner.
//!
//! None of these escape the hour loop: the generator logs them and falls
//! back to templates. They exist so the capability, the parser and the
//! prompt engine can report what went wrong with enough context to log.

use std::num::ParseIntError;

/// Failures reported by an external tweet capability.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    /// The backend answered with an error or could not be reached.
    #[error("capability backend error: {message}")]
    Backend {
        /// Backend-supplied description.
        message: String,
    },

    /// The call did not finish before its deadline.
    #[error("capability call exceeded {timeout_ms}ms")]
    Timeout {
        /// The deadline that was exceeded.
        timeout_ms: u128,
    },
}

/// Errors raised while preparing a request or reading a response.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A prompt template failed to load or render.
    #[error("template {name}: {source}")]
    Template {
        /// Template name.
        name: String,
        /// Underlying `minijinja` error.
        source: minijinja::Error,
    },

    /// A prompt template could not be read from disk.
    #[error("failed to read template {path}: {source}")]
    TemplateIo {
        /// File that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The capability response held no usable JSON.
    #[error("response parse error: {reason}")]
    Parse {
        /// What the parser gave up on.
        reason: String,
    },

    /// An environment variable held an unparseable number.
    #[error("invalid value {value:?} for {name}: {source}")]
    Env {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Underlying parse error.
        source: ParseIntError,
    },

    /// The capability call itself failed.
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}
