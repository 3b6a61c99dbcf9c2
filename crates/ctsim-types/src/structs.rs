//! Core entity structs: personas, tokens, tweets and run results.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{InteractionKind, MarketCondition, MemeStyle, PersonaType, PredictedOutcome};
use crate::ids::TweetId;

/// Maximum nesting level of a reply/quote chain.
pub const MAX_THREAD_DEPTH: u8 = 3;

// ---------------------------------------------------------------------------
// Persona
// ---------------------------------------------------------------------------

/// An immutable catalog entry describing one simulated CT account.
///
/// The four behavioral floats are all in `[0, 1]`. Personas are shared
/// read-only between the registry and every tweet they author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Persona {
    /// Archetype tag.
    #[serde(rename = "type")]
    pub kind: PersonaType,
    /// Display name.
    pub name: String,
    /// Handle without the leading `@`.
    pub handle: String,
    /// Profile bio.
    pub bio: String,
    /// How often the account engages.
    pub engagement_rate: f64,
    /// Reach of the account's posts.
    pub influence_score: f64,
    /// How easily the account apes in.
    pub fomo_susceptibility: f64,
    /// How much negative narrative the account produces.
    pub fud_generation: f64,
    /// In-character behavior description used in model prompts.
    pub personality_prompt: String,
    /// Phrases the account uses often.
    pub vocabulary: Vec<String>,
}

impl Persona {
    /// Render the in-character system context for model prompts.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {name} (@{handle}), a Crypto Twitter personality.\n\n\
             Bio: {bio}\n\n\
             Personality: {personality}\n\n\
             Vocabulary you use often: {vocabulary}\n\n\
             You're reacting to a new shitcoin. Stay in character. Keep responses tweet-length (under 280 chars).\n\
             Your engagement style:\n\
             - FOMO level: {fomo}\n\
             - FUD tendency: {fud}\n",
            name = self.name,
            handle = self.handle,
            bio = self.bio,
            personality = self.personality_prompt,
            vocabulary = self.vocabulary.join(", "),
            fomo = level(self.fomo_susceptibility),
            fud = level(self.fud_generation),
        )
    }
}

fn level(value: f64) -> &'static str {
    if value > 0.7 {
        "HIGH"
    } else if value > 0.4 {
        "MEDIUM"
    } else {
        "LOW"
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// The launch being simulated. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Token {
    /// Full token name.
    pub name: String,
    /// Ticker symbol without the `$`.
    pub ticker: String,
    /// The hook: why anyone should care.
    pub narrative: String,
    /// Meme aesthetic.
    #[serde(default)]
    pub meme_style: MemeStyle,
    /// Optional one-liner catchphrase.
    #[serde(default)]
    pub tagline: Option<String>,
    /// Market regime at launch.
    #[serde(default)]
    pub market_condition: MarketCondition,
    /// Other hot tokens competing for attention right now.
    #[serde(default)]
    pub competing_narratives: Vec<String>,
    /// Starting liquidity, for context only.
    #[serde(default = "default_liquidity")]
    pub initial_liquidity_usd: f64,
}

const fn default_liquidity() -> f64 {
    10_000.0
}

impl Token {
    /// Create a token with default style, regime and liquidity.
    pub fn new(name: impl Into<String>, ticker: impl Into<String>, narrative: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
            narrative: narrative.into(),
            meme_style: MemeStyle::default(),
            tagline: None,
            market_condition: MarketCondition::default(),
            competing_narratives: Vec::new(),
            initial_liquidity_usd: default_liquidity(),
        }
    }

    /// Return a copy launched into a different market regime.
    #[must_use]
    pub fn with_market(mut self, market_condition: MarketCondition) -> Self {
        self.market_condition = market_condition;
        self
    }

    /// Render the elevator pitch used as model context.
    pub fn pitch(&self) -> String {
        let mut pitch = format!("${} - {}\nNarrative: {}\n", self.ticker, self.name, self.narrative);
        if let Some(tagline) = &self.tagline {
            pitch.push_str("Tagline: ");
            pitch.push_str(tagline);
            pitch.push('\n');
        }
        pitch.push_str("Vibe: ");
        pitch.push_str(self.meme_style.as_str());
        pitch
    }
}

// ---------------------------------------------------------------------------
// Tweet
// ---------------------------------------------------------------------------

/// A simulated tweet.
///
/// `hour` always equals the owning state's `current_hour` at creation, and
/// `thread_depth` never exceeds [`MAX_THREAD_DEPTH`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tweet {
    /// Run-local identifier.
    pub id: TweetId,
    /// The persona that posted it.
    pub author: Arc<Persona>,
    /// Tweet text.
    pub content: String,
    /// Simulation hour of creation.
    pub hour: u32,
    /// Like count.
    pub likes: u64,
    /// Retweet count.
    pub retweets: u64,
    /// Reply count.
    pub replies: u64,
    /// Sentiment in `[-1, 1]`; -1 is maximum FUD, 1 is maximum hype.
    pub sentiment: f64,
    /// Original post, reply or quote.
    pub kind: InteractionKind,
    /// The tweet being replied to or quoted.
    pub parent: Option<TweetId>,
    /// Nesting level within a thread (0 for originals).
    pub thread_depth: u8,
}

impl Tweet {
    /// Likes plus retweets plus replies.
    pub const fn engagement(&self) -> u64 {
        self.likes.saturating_add(self.retweets).saturating_add(self.replies)
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// The immutable record compiled from a terminal simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationResult {
    /// The simulated token.
    pub token: Token,
    /// Engagement per mention, scaled by 1/100.
    pub viral_coefficient: f64,
    /// Highest hourly sentiment average.
    pub peak_sentiment: f64,
    /// One minus the variance of hourly sentiment, floored at 0.
    pub sentiment_stability: f64,
    /// How well the token survives skeptics, in `[0, 1]`.
    pub fud_resistance: f64,
    /// Number of tweets about the token.
    #[ts(type = "number")]
    pub total_mentions: u64,
    /// Likes plus retweets plus replies across all tweets.
    #[ts(type = "number")]
    pub total_engagement: u64,
    /// Tweets posted by whales and influencers.
    #[ts(type = "number")]
    pub influencer_pickups: u64,
    /// Index of the peak in the hourly sentiment history.
    pub hours_to_peak: u32,
    /// Hour at which the token was considered dead, if it was.
    pub hours_to_death: Option<u32>,
    /// What CT ended up calling it.
    pub dominant_narrative: String,
    /// Main criticisms.
    pub top_fud_points: Vec<String>,
    /// Classified outcome.
    pub predicted_outcome: PredictedOutcome,
    /// Confidence in the classification, in `[0, 1]`.
    pub confidence: f64,
}

impl core::fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "=== SIMULATION RESULTS: ${} ===", self.token.ticker)?;
        writeln!(f)?;
        writeln!(f, "VIRAL SCORE: {:.2}x", self.viral_coefficient)?;
        writeln!(
            f,
            "SENTIMENT: {:+.2} peak | {:.0}% stable",
            self.peak_sentiment,
            self.sentiment_stability * 100.0
        )?;
        writeln!(f, "FUD RESISTANCE: {:.0}%", self.fud_resistance * 100.0)?;
        writeln!(f)?;
        writeln!(f, "ENGAGEMENT:")?;
        writeln!(f, "- {} mentions", self.total_mentions)?;
        writeln!(f, "- {} total engagement", self.total_engagement)?;
        writeln!(f, "- {} influencer pickups", self.influencer_pickups)?;
        writeln!(f)?;
        writeln!(f, "TIMELINE:")?;
        writeln!(f, "- Peak hype at hour {}", self.hours_to_peak)?;
        match self.hours_to_death {
            Some(hour) => writeln!(f, "- Dead by hour {hour}")?,
            None => writeln!(f, "- Still alive")?,
        }
        writeln!(f)?;
        writeln!(f, "CT VERDICT: \"{}\"", self.dominant_narrative)?;
        writeln!(f)?;
        writeln!(f, "TOP FUD:")?;
        for point in self.top_fud_points.iter().take(3) {
            writeln!(f, "- {point}")?;
        }
        writeln!(f)?;
        write!(
            f,
            "PREDICTION: {} ({:.0}% confidence)",
            self.predicted_outcome.as_str().to_uppercase(),
            self.confidence * 100.0
        )
    }
}
