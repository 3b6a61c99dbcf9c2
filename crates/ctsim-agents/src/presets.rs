//! Ready-made launch tokens for common meme archetypes.
//!
//! A preset is a complete [`Token`] plus a short description and a
//! category. All presets launch into a crab market; callers that want a
//! different regime or ticker adjust the returned token.

use ctsim_types::{MarketCondition, MemeStyle, Token};

/// Longest ticker a preset override may set, in characters.
pub const MAX_TICKER_LEN: usize = 10;

/// A catalog entry with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    /// Lookup name.
    pub name: &'static str,
    /// One-line pitch of the archetype.
    pub description: &'static str,
    /// Broad grouping (`animal`, `tech`, `meme`, `culture`).
    pub category: &'static str,
    /// The token the preset launches.
    pub token: Token,
}

/// Lookup of a name that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset '{name}'. Available: {available}")]
pub struct UnknownPreset {
    /// The name that was asked for.
    pub name: String,
    /// Comma-separated catalog names.
    pub available: String,
}

struct Entry {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    token_name: &'static str,
    ticker: &'static str,
    narrative: &'static str,
    meme_style: MemeStyle,
    tagline: &'static str,
    competing: &'static [&'static str],
}

const CATALOG: [Entry; 6] = [
    Entry {
        name: "doge",
        description: "Classic Doge-style dog coin with wholesome community vibes",
        category: "animal",
        token_name: "Classic Dog Coin",
        ticker: "DOGE",
        narrative: "The OG dog coin energy - much wow, very gains, so community",
        meme_style: MemeStyle::Cute,
        tagline: "such gains, very moon",
        competing: &["cat coins", "other dog coins"],
    },
    Entry {
        name: "ai",
        description: "AI/autonomous agent narrative riding the AI hype wave",
        category: "tech",
        token_name: "AI Agent Token",
        ticker: "AGENT",
        narrative: "Autonomous AI agent managing its own treasury - the future of crypto",
        meme_style: MemeStyle::Topical,
        tagline: "AI that trades for you",
        competing: &["other AI tokens", "GPT coins"],
    },
    Entry {
        name: "pepe",
        description: "Nostalgic Pepe frog meme with classic meme culture appeal",
        category: "meme",
        token_name: "Frog Meme Coin",
        ticker: "PEPE",
        narrative: "Feels good man - the iconic frog returns to claim the throne",
        meme_style: MemeStyle::Nostalgic,
        tagline: "feels good man",
        competing: &["other frog coins", "wojak"],
    },
    Entry {
        name: "cat",
        description: "Cat coin meta play - cute aesthetic, anti-dog narrative",
        category: "animal",
        token_name: "Cat Supremacy",
        ticker: "CAT",
        narrative: "Dogs had their day - cats are taking over crypto Twitter",
        meme_style: MemeStyle::Cute,
        tagline: "meow money meow problems",
        competing: &["dog coins", "other cat coins"],
    },
    Entry {
        name: "edgy",
        description: "Edgy/dark humor aesthetic for degen audiences",
        category: "culture",
        token_name: "Dark Humor Coin",
        ticker: "EDGE",
        narrative: "Too edgy for normies - if you know you know",
        meme_style: MemeStyle::Edgy,
        tagline: "we do a little trolling",
        competing: &["normie coins"],
    },
    Entry {
        name: "meta",
        description: "Ironic, self-referential meta commentary on crypto culture",
        category: "culture",
        token_name: "Self-Aware Token",
        ticker: "META",
        narrative: "A token about tokens - we're all just exit liquidity anyway",
        meme_style: MemeStyle::Absurd,
        tagline: "the real token was the friends we rugged along the way",
        competing: &["serious projects"],
    },
];

impl Entry {
    fn token(&self) -> Token {
        let mut token = Token::new(self.token_name, self.ticker, self.narrative)
            .with_market(MarketCondition::Crab);
        token.meme_style = self.meme_style;
        token.tagline = Some(self.tagline.to_owned());
        token.competing_narratives = self.competing.iter().map(|&n| n.to_owned()).collect();
        token
    }
}

/// Catalog names, in catalog order.
pub fn list_presets() -> Vec<&'static str> {
    CATALOG.iter().map(|entry| entry.name).collect()
}

/// Full catalog entry for `name`, matched case-insensitively.
///
/// # Errors
///
/// Returns [`UnknownPreset`] when no entry has that name.
pub fn preset_info(name: &str) -> Result<Preset, UnknownPreset> {
    let entry = CATALOG
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| UnknownPreset {
            name: name.to_owned(),
            available: list_presets().join(", "),
        })?;
    Ok(Preset {
        name: entry.name,
        description: entry.description,
        category: entry.category,
        token: entry.token(),
    })
}

/// The token for preset `name`, optionally under another ticker.
///
/// A non-empty override is upper-cased and cut to [`MAX_TICKER_LEN`]
/// characters; an empty one keeps the preset's ticker.
///
/// # Errors
///
/// Returns [`UnknownPreset`] when no entry has that name.
pub fn preset(name: &str, ticker_override: Option<&str>) -> Result<Token, UnknownPreset> {
    let mut token = preset_info(name)?.token;
    if let Some(ticker) = ticker_override.filter(|t| !t.is_empty()) {
        token.ticker = ticker.to_uppercase().chars().take(MAX_TICKER_LEN).collect();
    }
    Ok(token)
}
