//! Per-run mutable simulation state.
//!
//! A [`SimulationState`] is created once per run, owned exclusively by that
//! run, and mutated only by [`crate::update::apply`]. Everything downstream
//! (activation, hot tweet scoring, outcome compilation) reads it.

use ctsim_types::{Token, Tweet, TweetId};

/// Awareness a token starts with: the share of CT that has seen it.
pub const INITIAL_AWARENESS: f64 = 0.1;

/// Momentum below which a token may be declared dead.
pub const DEATH_MOMENTUM: f64 = -0.7;

/// Awareness below which a token may be declared dead.
pub const DEATH_AWARENESS: f64 = 0.3;

/// Hour after which the death check applies.
pub const DEATH_GRACE_HOURS: u32 = 12;

/// Number of recent tweets rendered as model context.
pub const CONTEXT_TWEETS: usize = 5;

/// The mutable record of one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// The token under simulation.
    pub token: Token,
    /// Hour counter; every tweet created now carries this hour.
    pub current_hour: u32,
    /// All tweets in insertion order.
    pub tweets: Vec<Tweet>,
    /// Mean sentiment of every hour that had at least one tweet.
    pub sentiment_history: Vec<f64>,
    /// Tweets about the token.
    pub total_mentions: u64,
    /// Likes plus retweets plus replies across all tweets.
    pub total_engagement: u64,
    /// Tweets by whales and influencers.
    pub influencer_mentions: u64,
    /// Share of CT exposed to the token, in `[0, 1]`, never decreasing.
    pub awareness: f64,
    /// Smoothed hourly sentiment, in `[-1, 1]`.
    pub momentum: f64,
    next_id: u64,
}

impl SimulationState {
    /// Fresh state at hour 0.
    pub const fn new(token: Token) -> Self {
        Self {
            token,
            current_hour: 0,
            tweets: Vec::new(),
            sentiment_history: Vec::new(),
            total_mentions: 0,
            total_engagement: 0,
            influencer_mentions: 0,
            awareness: INITIAL_AWARENESS,
            momentum: 0.0,
            next_id: 0,
        }
    }

    /// Allocate the next run-local tweet id.
    pub const fn next_tweet_id(&mut self) -> TweetId {
        let id = TweetId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Look up a tweet by id.
    pub fn tweet(&self, id: TweetId) -> Option<&Tweet> {
        self.tweets.iter().find(|t| t.id == id)
    }

    /// Tweet count, saturating at `u32::MAX`.
    pub fn tweet_count(&self) -> u32 {
        u32::try_from(self.tweets.len()).unwrap_or(u32::MAX)
    }

    /// The last few tweets rendered as `@handle: content`, one per line.
    pub fn recent_context(&self) -> String {
        let skip = self.tweets.len().saturating_sub(CONTEXT_TWEETS);
        self.tweets
            .iter()
            .skip(skip)
            .map(|t| format!("@{}: {}", t.author.handle, t.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Coarse read of the mood, used in model prompts.
    pub fn mood(&self) -> &'static str {
        if self.momentum > 0.3 {
            "bullish"
        } else if self.momentum < -0.3 {
            "bearish"
        } else {
            "neutral"
        }
    }

    /// Whether the token has crashed and been forgotten after `hour`.
    pub fn is_dead(&self, hour: u32) -> bool {
        self.momentum < DEATH_MOMENTUM && self.awareness < DEATH_AWARENESS && hour > DEATH_GRACE_HOURS
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use ctsim_agents::PersonaRegistry;
    use ctsim_types::{InteractionKind, PersonaType};

    use super::*;

    fn push_tweet(state: &mut SimulationState, content: &str) {
        let registry = PersonaRegistry::builtin();
        let id = state.next_tweet_id();
        state.tweets.push(Tweet {
            id,
            author: Arc::clone(registry.get(PersonaType::Degen)),
            content: content.to_owned(),
            hour: state.current_hour,
            likes: 0,
            retweets: 0,
            replies: 0,
            sentiment: 0.0,
            kind: InteractionKind::Original,
            parent: None,
            thread_depth: 0,
        });
    }

    #[test]
    fn new_state_starts_quiet() {
        let state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        assert_eq!(state.current_hour, 0);
        assert!((state.awareness - INITIAL_AWARENESS).abs() < f64::EPSILON);
        assert!(state.momentum.abs() < f64::EPSILON);
        assert!(state.recent_context().is_empty());
        assert_eq!(state.mood(), "neutral");
    }

    #[test]
    fn ids_are_sequential() {
        let mut state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        assert_eq!(state.next_tweet_id().sequence(), 0);
        assert_eq!(state.next_tweet_id().sequence(), 1);
        assert_eq!(state.next_tweet_id().to_string(), "tweet_2");
    }

    #[test]
    fn recent_context_keeps_last_five() {
        let mut state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        for n in 0..7 {
            push_tweet(&mut state, &format!("post {n}"));
        }
        let context = state.recent_context();
        assert_eq!(context.lines().count(), 5);
        assert!(context.starts_with("@degen_spartan_ii: post 2"));
        assert!(context.ends_with("post 6"));
    }

    #[test]
    fn lookup_by_id() {
        let mut state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        push_tweet(&mut state, "first");
        push_tweet(&mut state, "second");
        let id = state.tweets.get(1).unwrap().id;
        assert_eq!(state.tweet(id).unwrap().content, "second");
        assert!(state.tweet(TweetId::new(99)).is_none());
    }

    #[test]
    fn death_needs_all_three_conditions() {
        let mut state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        state.momentum = -0.8;
        state.awareness = 0.2;
        assert!(!state.is_dead(12));
        assert!(state.is_dead(13));
        state.awareness = 0.4;
        assert!(!state.is_dead(13));
    }
}
