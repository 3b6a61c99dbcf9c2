//! Enumeration types for the CT launch simulator.
//!
//! Persona archetypes, market regimes, meme styles, tweet interaction kinds
//! and predicted outcomes. All enums serialize as `snake_case` strings so the
//! event stream matches what the dashboard expects.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Personas
// ---------------------------------------------------------------------------

/// The archetype of a simulated CT account.
///
/// Type dispatch is done with `match` tables over this tag; personas carry
/// no behavior of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PersonaType {
    /// Apes into everything, optimistic to a fault.
    Degen,
    /// Assumes every launch is a rug until proven otherwise.
    Skeptic,
    /// Rarely speaks; when it does, people listen.
    Whale,
    /// Paid or self-interested shiller with a large following.
    Influencer,
    /// Newcomer following the smart money.
    Normie,
    /// Automated alert account posting token stats.
    Bot,
    /// Key opinion leader from the extended catalog.
    Kol,
}

impl PersonaType {
    /// Every base archetype, in catalog order. KOLs are a separate set.
    pub const BASE: [Self; 6] = [
        Self::Degen,
        Self::Skeptic,
        Self::Whale,
        Self::Influencer,
        Self::Normie,
        Self::Bot,
    ];

    /// Whether tweets from this archetype count as high-reach for hot tweet
    /// scoring.
    pub const fn is_high_reach(self) -> bool {
        matches!(self, Self::Whale | Self::Influencer | Self::Kol)
    }

    /// Whether tweets from this archetype boost awareness and count toward
    /// influencer pickups.
    pub const fn is_awareness_driver(self) -> bool {
        matches!(self, Self::Whale | Self::Influencer)
    }

    /// Wire name of the archetype.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Degen => "degen",
            Self::Skeptic => "skeptic",
            Self::Whale => "whale",
            Self::Influencer => "influencer",
            Self::Normie => "normie",
            Self::Bot => "bot",
            Self::Kol => "kol",
        }
    }
}

impl core::fmt::Display for PersonaType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Market context
// ---------------------------------------------------------------------------

/// The broader market regime the token launches into.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MarketCondition {
    /// Risk-off; skeptics dominate.
    Bear,
    /// Sideways chop.
    #[default]
    Crab,
    /// Risk-on.
    Bull,
    /// Everything pumps.
    Euphoria,
}

impl MarketCondition {
    /// Wire name of the regime.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bear => "bear",
            Self::Crab => "crab",
            Self::Bull => "bull",
            Self::Euphoria => "euphoria",
        }
    }
}

/// The meme aesthetic of the token.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MemeStyle {
    /// Doge, cats, wholesome.
    Cute,
    /// Dark humor, offensive.
    Edgy,
    /// Random, surreal.
    #[default]
    Absurd,
    /// Current events, trending.
    Topical,
    /// Retro, throwback.
    Nostalgic,
}

impl MemeStyle {
    /// Wire name of the style.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cute => "cute",
            Self::Edgy => "edgy",
            Self::Absurd => "absurd",
            Self::Topical => "topical",
            Self::Nostalgic => "nostalgic",
        }
    }
}

// ---------------------------------------------------------------------------
// Tweets
// ---------------------------------------------------------------------------

/// How a tweet relates to the rest of the conversation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum InteractionKind {
    /// A top-level post.
    #[default]
    Original,
    /// A reply in a thread.
    Reply,
    /// A quote tweet.
    Quote,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// The classified fate of the token at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PredictedOutcome {
    /// Sustained viral growth with strong sentiment.
    Moon,
    /// Smaller but loyal following.
    CultClassic,
    /// Gradual decline.
    SlowBleed,
    /// Sudden collapse.
    Rug,
    /// Short spike, then gone.
    PumpAndDump,
}

impl PredictedOutcome {
    /// Wire name of the outcome.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Moon => "moon",
            Self::CultClassic => "cult_classic",
            Self::SlowBleed => "slow_bleed",
            Self::Rug => "rug",
            Self::PumpAndDump => "pump_and_dump",
        }
    }
}

impl core::fmt::Display for PredictedOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_type_wire_names_match_serde() {
        for kind in PersonaType::BASE {
            let json = serde_json::to_string(&kind).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        let kol = serde_json::to_string(&PersonaType::Kol).unwrap_or_default();
        assert_eq!(kol, "\"kol\"");
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&PredictedOutcome::PumpAndDump).unwrap_or_default();
        assert_eq!(json, "\"pump_and_dump\"");
        assert_eq!(PredictedOutcome::CultClassic.to_string(), "cult_classic");
    }

    #[test]
    fn reach_tables() {
        assert!(PersonaType::Kol.is_high_reach());
        assert!(!PersonaType::Kol.is_awareness_driver());
        assert!(PersonaType::Whale.is_awareness_driver());
        assert!(!PersonaType::Degen.is_high_reach());
    }

    #[test]
    fn market_condition_defaults_to_crab() {
        assert_eq!(MarketCondition::default(), MarketCondition::Crab);
        let parsed: MarketCondition = serde_json::from_str("\"euphoria\"").unwrap_or_default();
        assert_eq!(parsed, MarketCondition::Euphoria);
    }
}
