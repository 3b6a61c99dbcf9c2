//! Folding an hour's tweets into the run state.
//!
//! [`apply`] is the only function that mutates a [`SimulationState`] once a
//! run is underway (the competition nudge aside). It keeps the invariants:
//! awareness never decreases and stays at most 1, momentum stays in
//! `[-1, 1]`, and the hour counter advances by exactly one per call.

use ctsim_types::Tweet;
use tracing::debug;

use crate::state::SimulationState;

/// Weight of the previous momentum in the smoothing step.
const MOMENTUM_DECAY: f64 = 0.7;

/// Engagement that buys one full unit of awareness.
const AWARENESS_PER_ENGAGEMENT: f64 = 50_000.0;

/// Awareness boost per whale or influencer tweet.
const AWARENESS_PER_DRIVER: f64 = 0.05;

/// Append `new_tweets` and advance the hour.
///
/// With at least one tweet, the hour's mean sentiment is appended to the
/// history and blended into momentum, awareness grows with engagement and
/// high-reach activity, and the counters are bumped. `total_engagement`
/// grows by exactly the engagement rolled on the new tweets, so it always
/// equals the sum over the timeline. The hour counter always moves.
#[allow(clippy::cast_precision_loss)]
pub fn apply(state: &mut SimulationState, new_tweets: Vec<Tweet>) {
    if !new_tweets.is_empty() {
        let count = new_tweets.len();
        let mean = new_tweets.iter().map(|t| t.sentiment).sum::<f64>() / count as f64;
        let engagement = new_tweets
            .iter()
            .fold(0_u64, |acc, t| acc.saturating_add(t.engagement()));
        let drivers = new_tweets
            .iter()
            .filter(|t| t.author.kind.is_awareness_driver())
            .count();

        state.sentiment_history.push(mean);
        state.momentum = MOMENTUM_DECAY
            .mul_add(state.momentum, (1.0 - MOMENTUM_DECAY) * mean)
            .clamp(-1.0, 1.0);

        let boost = engagement as f64 / AWARENESS_PER_ENGAGEMENT + drivers as f64 * AWARENESS_PER_DRIVER;
        state.awareness = (state.awareness + boost.max(0.0)).min(1.0);

        state.total_mentions = state.total_mentions.saturating_add(count as u64);
        state.total_engagement = state.total_engagement.saturating_add(engagement);
        state.influencer_mentions = state.influencer_mentions.saturating_add(drivers as u64);

        state.tweets.extend(new_tweets);

        debug!(
            hour = state.current_hour,
            tweets = count,
            engagement,
            mean_sentiment = mean,
            momentum = state.momentum,
            awareness = state.awareness,
            "Hour applied"
        );
    }

    state.current_hour = state.current_hour.saturating_add(1);
}
