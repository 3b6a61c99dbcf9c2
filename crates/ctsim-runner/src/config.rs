//! Configuration for capability-backed generation.
//!
//! Loaded from environment variables so the engine binary can be pointed at
//! a different deadline or template set without touching the YAML file.

use std::time::Duration;

use crate::error::RunnerError;

/// Default capability deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 7000;

/// Default response budget handed to the capability.
pub const DEFAULT_MAX_TOKENS: u32 = 700;

/// Runner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityConfig {
    /// Deadline for one capability call.
    pub timeout: Duration,
    /// Response budget passed through to the capability.
    pub max_tokens: u32,
    /// Optional directory holding `tweet.j2` and `interaction.j2` overrides.
    pub templates_dir: Option<String>,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_tokens: DEFAULT_MAX_TOKENS,
            templates_dir: None,
        }
    }
}

impl CapabilityConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `CAPABILITY_TIMEOUT_MS` -- call deadline in milliseconds (default 7000)
    /// - `CAPABILITY_MAX_TOKENS` -- response budget (default 700)
    /// - `CAPABILITY_TEMPLATES_DIR` -- prompt template overrides
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunnerError> {
        let timeout_ms = match lookup("CAPABILITY_TIMEOUT_MS") {
            Some(value) => parse_number::<u64>("CAPABILITY_TIMEOUT_MS", value)?,
            None => DEFAULT_TIMEOUT_MS,
        };
        let max_tokens = match lookup("CAPABILITY_MAX_TOKENS") {
            Some(value) => parse_number::<u32>("CAPABILITY_MAX_TOKENS", value)?,
            None => DEFAULT_MAX_TOKENS,
        };

        Ok(Self {
            timeout: Duration::from_millis(timeout_ms),
            max_tokens,
            templates_dir: lookup("CAPABILITY_TEMPLATES_DIR").filter(|dir| !dir.trim().is_empty()),
        })
    }
}

fn parse_number<T>(name: &'static str, value: String) -> Result<T, RunnerError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    match value.trim().parse() {
        Ok(n) => Ok(n),
        Err(source) => Err(RunnerError::Env {
            name,
            value,
            source,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_variables_use_defaults() {
        let config = CapabilityConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CapabilityConfig::default());
        assert_eq!(config.timeout, Duration::from_millis(7000));
        assert_eq!(config.max_tokens, 700);
    }

    #[test]
    fn variables_override_defaults() {
        let config = CapabilityConfig::from_lookup(|name| match name {
            "CAPABILITY_TIMEOUT_MS" => Some("2500".to_owned()),
            "CAPABILITY_MAX_TOKENS" => Some(" 300 ".to_owned()),
            "CAPABILITY_TEMPLATES_DIR" => Some("prompts".to_owned()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.max_tokens, 300);
        assert_eq!(config.templates_dir.as_deref(), Some("prompts"));
    }

    #[test]
    fn garbage_timeout_is_rejected() {
        let err = CapabilityConfig::from_lookup(|name| {
            (name == "CAPABILITY_TIMEOUT_MS").then(|| "soon".to_owned())
        })
        .unwrap_err();
        assert!(matches!(err, RunnerError::Env { name: "CAPABILITY_TIMEOUT_MS", .. }));
    }
}
