//! The tweet generation seam.
//!
//! The hour loop asks a [`TweetGenerator`] for one draft per acting persona
//! and one draft per planned interaction. Implementations may suspend (a
//! model call) or answer immediately ([`TemplateGenerator`]); the core never
//! assumes a runtime. Whatever the implementation, it must return exactly
//! one [`Draft`] per input, in input order.
//!
//! Engagement is not the generator's business: [`roll_engagement`] assigns
//! likes, retweets and replies from the author's reach and the current
//! momentum once a draft becomes a [`Tweet`].

use std::future::Future;
use std::sync::Arc;

use ctsim_agents::templates;
use ctsim_types::{InteractionKind, Persona, Token, TweetId};
use rand::Rng;

use crate::state::SimulationState;

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Text and sentiment for one tweet, before engagement is rolled.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    /// Tweet text.
    pub content: String,
    /// Sentiment in `[-1, 1]`.
    pub sentiment: f64,
}

impl Draft {
    /// Build a draft, clamping the sentiment into range.
    pub fn new(content: impl Into<String>, sentiment: f64) -> Self {
        Self {
            content: content.into(),
            sentiment: if sentiment.is_finite() {
                sentiment.clamp(-1.0, 1.0)
            } else {
                0.0
            },
        }
    }
}

impl From<(String, f64)> for Draft {
    fn from((content, sentiment): (String, f64)) -> Self {
        Self::new(content, sentiment)
    }
}

/// A reply or quote the interaction engine decided should happen.
#[derive(Debug, Clone)]
pub struct InteractionPlan {
    /// Who is answering.
    pub persona: Arc<Persona>,
    /// The tweet being answered.
    pub target: TweetId,
    /// Author of the target tweet.
    pub target_author: Arc<Persona>,
    /// Text of the target tweet.
    pub target_content: String,
    /// Sentiment of the target tweet.
    pub target_sentiment: f64,
    /// Reply or quote.
    pub kind: InteractionKind,
    /// Thread depth of the new tweet.
    pub depth: u8,
}

// ---------------------------------------------------------------------------
// Seam
// ---------------------------------------------------------------------------

/// A source of tweet text.
///
/// Both methods return one [`Draft`] per input, in input order. Failures
/// inside an implementation (timeouts, bad payloads) are its own problem:
/// it must fill the gaps itself, usually from [`templates`].
pub trait TweetGenerator {
    /// Produce original posts for the personas active this hour.
    ///
    /// `context` is the recent timeline rendered as `@handle: content`
    /// lines; it is empty at the start of a run.
    fn generate_batch<R: Rng + ?Sized>(
        &self,
        personas: &[Arc<Persona>],
        token: &Token,
        state: &SimulationState,
        context: &str,
        rng: &mut R,
    ) -> impl Future<Output = Vec<Draft>>;

    /// Produce replies and quotes for the planned interactions.
    fn generate_interactions<R: Rng + ?Sized>(
        &self,
        plans: &[InteractionPlan],
        token: &Token,
        state: &SimulationState,
        rng: &mut R,
    ) -> impl Future<Output = Vec<Draft>>;
}

/// Deterministic, template-backed generator.
///
/// Every draft comes from the archetype's weighted template set, so the
/// output depends only on the personas and the random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    /// Create a template generator.
    pub const fn new() -> Self {
        Self
    }

    /// Synchronous form of [`TweetGenerator::generate_batch`].
    pub fn originals<R: Rng + ?Sized>(
        personas: &[Arc<Persona>],
        token: &Token,
        rng: &mut R,
    ) -> Vec<Draft> {
        personas
            .iter()
            .map(|p| Draft::from(templates::original(p.kind, &token.ticker, rng)))
            .collect()
    }

    /// Synchronous form of [`TweetGenerator::generate_interactions`].
    pub fn interactions<R: Rng + ?Sized>(
        plans: &[InteractionPlan],
        token: &Token,
        rng: &mut R,
    ) -> Vec<Draft> {
        plans
            .iter()
            .map(|plan| {
                Draft::from(templates::interaction(
                    plan.persona.kind,
                    plan.kind,
                    &token.ticker,
                    &plan.target_author.handle,
                    rng,
                ))
            })
            .collect()
    }
}

impl TweetGenerator for TemplateGenerator {
    fn generate_batch<R: Rng + ?Sized>(
        &self,
        personas: &[Arc<Persona>],
        token: &Token,
        _state: &SimulationState,
        _context: &str,
        rng: &mut R,
    ) -> impl Future<Output = Vec<Draft>> {
        std::future::ready(Self::originals(personas, token, rng))
    }

    fn generate_interactions<R: Rng + ?Sized>(
        &self,
        plans: &[InteractionPlan],
        token: &Token,
        _state: &SimulationState,
        rng: &mut R,
    ) -> impl Future<Output = Vec<Draft>> {
        std::future::ready(Self::interactions(plans, token, rng))
    }
}

// ---------------------------------------------------------------------------
// Engagement
// ---------------------------------------------------------------------------

/// Likes, retweets and replies rolled for a new tweet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engagement {
    /// Like count.
    pub likes: u64,
    /// Retweet count.
    pub retweets: u64,
    /// Reply count.
    pub replies: u64,
}

/// Engagement scale for original posts.
pub const ORIGINAL_SCALE: f64 = 1.0;

/// Engagement scale for replies and quotes.
pub const INTERACTION_SCALE: f64 = 0.5;

/// Roll engagement for a tweet by an author with `influence`.
///
/// The base is `influence * 1000`, truncated to a whole count before
/// `scale` applies; likes and retweets scale with
/// `1 + momentum / 2`, replies do not. Each count gets its own uniform
/// jitter and is floored at zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn roll_engagement<R: Rng + ?Sized>(
    influence: f64,
    momentum: f64,
    scale: f64,
    rng: &mut R,
) -> Engagement {
    let base = (influence * 1000.0).max(0.0).trunc() * scale;
    let multiplier = 1.0 + momentum * 0.5;
    let likes = base * multiplier * rng.random_range(0.5..1.5);
    let retweets = base * 0.3 * multiplier * rng.random_range(0.3..1.2);
    let replies = base * 0.1 * rng.random_range(0.5..2.0);
    Engagement {
        likes: likes.max(0.0).floor() as u64,
        retweets: retweets.max(0.0).floor() as u64,
        replies: replies.max(0.0).floor() as u64,
    }
}

/// Scale likes and retweets by an attention factor, flooring the result.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn scale_count(count: u64, factor: f64) -> u64 {
    (count as f64 * factor).max(0.0).floor() as u64
}
