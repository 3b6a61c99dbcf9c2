//! The ordered event schema produced by a streaming run.
//!
//! The wire shape mirrors what the outer transport layer forwards over SSE:
//! every event is a JSON object tagged by `type`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{InteractionKind, PersonaType};
use crate::ids::TweetId;
use crate::structs::{SimulationResult, Tweet};

/// A single event in a simulation stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SimulationEvent {
    /// A tweet was posted.
    Tweet {
        /// The posted tweet, flattened for display.
        tweet: TweetEvent,
    },
    /// An hour finished.
    Progress(ProgressEvent),
    /// Free-text termination note.
    Status {
        /// Human-readable message.
        message: String,
    },
    /// The run finished and was compiled.
    Result {
        /// The full metric set.
        result: Box<SimulationResult>,
    },
}

impl SimulationEvent {
    /// Whether this is the final event of a stream.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Result { .. })
    }
}

/// Display form of a [`Tweet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TweetEvent {
    /// Tweet identifier.
    #[ts(type = "string")]
    pub id: TweetId,
    /// Author display name.
    pub author_name: String,
    /// Author handle.
    pub author_handle: String,
    /// Author archetype.
    pub author_type: PersonaType,
    /// Tweet text.
    pub content: String,
    /// Hour the tweet was posted.
    pub hour: u32,
    /// Like count.
    #[ts(type = "number")]
    pub likes: u64,
    /// Retweet count.
    #[ts(type = "number")]
    pub retweets: u64,
    /// Reply count.
    #[ts(type = "number")]
    pub replies: u64,
    /// Sentiment in `[-1, 1]`.
    pub sentiment: f64,
    /// Original, reply or quote.
    pub interaction: InteractionKind,
    /// Parent tweet for replies and quotes.
    #[ts(type = "string | null")]
    pub parent: Option<TweetId>,
    /// Thread nesting level.
    pub thread_depth: u8,
}

impl From<&Tweet> for TweetEvent {
    fn from(tweet: &Tweet) -> Self {
        Self {
            id: tweet.id,
            author_name: tweet.author.name.clone(),
            author_handle: tweet.author.handle.clone(),
            author_type: tweet.author.kind,
            content: tweet.content.clone(),
            hour: tweet.hour,
            likes: tweet.likes,
            retweets: tweet.retweets,
            replies: tweet.replies,
            sentiment: tweet.sentiment,
            interaction: tweet.kind,
            parent: tweet.parent,
            thread_depth: tweet.thread_depth,
        }
    }
}

/// Per-hour progress snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProgressEvent {
    /// The hour that just finished.
    pub hour: u32,
    /// The requested hour budget.
    pub total_hours: u32,
    /// Momentum after the hour, rounded to three decimals.
    pub momentum: f64,
    /// Awareness after the hour, rounded to three decimals.
    pub awareness: f64,
    /// Tweets in the run so far.
    pub tweet_count: u32,
}
