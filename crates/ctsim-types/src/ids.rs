//! Type-safe identifiers.
//!
//! Tweet identifiers are sequence numbers assigned by the owning run, so two
//! runs fed the same random source produce the same ids. They render as
//! `tweet_<n>` on the wire, and as plain strings in the generated bindings.

use serde::{Deserialize, Serialize};

/// Unique identifier for a tweet within a single simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TweetId(u64);

impl TweetId {
    /// Wire prefix for rendered ids.
    const PREFIX: &'static str = "tweet_";

    /// Create an identifier from a run-local sequence number.
    pub const fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    /// Return the run-local sequence number.
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for TweetId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl From<TweetId> for String {
    fn from(id: TweetId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for TweetId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_prefix(Self::PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .map(Self)
            .ok_or_else(|| format!("invalid tweet id: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_prefix() {
        assert_eq!(TweetId::new(7).to_string(), "tweet_7");
    }

    #[test]
    fn parses_wire_form() {
        let id: Result<TweetId, _> = serde_json::from_str("\"tweet_42\"");
        assert_eq!(id.ok(), Some(TweetId::new(42)));

        let bad: Result<TweetId, _> = serde_json::from_str("\"reply_42\"");
        assert!(bad.is_err());
    }
}
