//! Reply and quote threads.
//!
//! Two phases run each hour after the original posts are drafted. First the
//! recent timeline is scored and the hottest few tweets are picked as
//! targets. Then a fixed number of draws pair a random hot tweet with a
//! random persona other than its author, each accepted with a probability
//! that depends on the target's traction and the pair's relationship.

use std::sync::Arc;

use ctsim_types::{InteractionKind, MAX_THREAD_DEPTH, Persona, PersonaType, Tweet};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::generator::InteractionPlan;
use crate::state::SimulationState;

/// How far back (in hours) a tweet can still be hot.
pub const HOT_WINDOW_HOURS: u32 = 2;

/// Maximum number of hot tweets per hour.
pub const MAX_HOT_TWEETS: usize = 5;

/// Ceiling on the acceptance probability of a single draw.
const MAX_ACCEPT: f64 = 0.6;

/// Score a candidate target.
fn hot_score(tweet: &Tweet) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let traction = tweet.likes.saturating_add(tweet.retweets) as f64 / 1000.0;
    let reach = if tweet.author.kind.is_high_reach() { 0.3 } else { 0.0 };
    traction + tweet.sentiment.abs() * 0.5 + reach
}

/// The tweets most likely to draw replies this hour.
///
/// Candidates are tweets from the last [`HOT_WINDOW_HOURS`] hours whose
/// thread still has room to grow. At most [`MAX_HOT_TWEETS`] are returned,
/// highest score first; equal scores keep timeline order.
pub fn identify_hot_tweets(state: &SimulationState) -> Vec<&Tweet> {
    let since = state.current_hour.saturating_sub(HOT_WINDOW_HOURS);
    let mut scored: Vec<(f64, &Tweet)> = state
        .tweets
        .iter()
        .filter(|t| t.hour >= since && t.thread_depth < MAX_THREAD_DEPTH)
        .map(|t| (hot_score(t), t))
        .collect();
    // Stable sort keeps insertion order among equal scores.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(MAX_HOT_TWEETS).map(|(_, t)| t).collect()
}

/// Extra pull between an answering persona and a target tweet.
fn relationship_bonus(persona: PersonaType, target: &Tweet) -> f64 {
    match (persona, target.author.kind) {
        (PersonaType::Skeptic, _) if target.sentiment > 0.5 => 0.15,
        (PersonaType::Degen | PersonaType::Influencer, PersonaType::Whale) => 0.15,
        (PersonaType::Normie, _) => 0.10,
        _ => 0.0,
    }
}

/// Probability that `persona` answers `target`.
pub fn accept_probability(persona: PersonaType, target: &Tweet) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let traction = (target.engagement() as f64 / 1000.0 * 0.2).min(0.2);
    let depth_penalty = f64::from(target.thread_depth) * 0.1;
    let p = 0.3 + traction + relationship_bonus(persona, target) + target.sentiment.abs() * 0.1
        - depth_penalty;
    p.min(MAX_ACCEPT)
}

/// Reply or quote, by archetype.
fn choose_kind<R: Rng + ?Sized>(persona: PersonaType, target: &Tweet, rng: &mut R) -> InteractionKind {
    let quote_chance = match persona {
        PersonaType::Influencer | PersonaType::Kol => 0.5,
        PersonaType::Skeptic if target.sentiment > 0.5 => 0.6,
        PersonaType::Normie => 0.0,
        _ => 0.3,
    };
    if rng.random_bool(quote_chance) {
        InteractionKind::Quote
    } else {
        InteractionKind::Reply
    }
}

/// Number of draws for a population at a given awareness.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn interaction_draws(population: usize, awareness: f64) -> usize {
    let draws = (population as f64 * awareness * 0.15).floor().max(0.0) as usize;
    draws.max(1)
}

/// Plan this hour's replies and quotes against `hot`.
///
/// Returns nothing when there are no hot tweets. Every plan's depth is one
/// more than its target's, which is below [`MAX_THREAD_DEPTH`] by
/// construction of the hot set.
pub fn select_interactions<R: Rng + ?Sized>(
    state: &SimulationState,
    hot: &[&Tweet],
    population: &[Arc<Persona>],
    rng: &mut R,
) -> Vec<InteractionPlan> {
    if hot.is_empty() {
        return Vec::new();
    }

    let draws = interaction_draws(population.len(), state.awareness);
    let mut plans = Vec::new();

    for _ in 0..draws {
        let Some(&target) = hot.choose(rng) else {
            break;
        };
        let candidates: Vec<&Arc<Persona>> = population
            .iter()
            .filter(|p| p.handle != target.author.handle)
            .collect();
        let Some(&persona) = candidates.choose(rng) else {
            continue;
        };

        let p = accept_probability(persona.kind, target);
        if !rng.random_bool(p.clamp(0.0, 1.0)) {
            continue;
        }

        let kind = choose_kind(persona.kind, target, rng);
        let depth = target.thread_depth.saturating_add(1).min(MAX_THREAD_DEPTH);
        plans.push(InteractionPlan {
            persona: Arc::clone(persona),
            target: target.id,
            target_author: Arc::clone(&target.author),
            target_content: target.content.clone(),
            target_sentiment: target.sentiment,
            kind,
            depth,
        });
    }

    debug!(
        hour = state.current_hour,
        hot = hot.len(),
        draws,
        planned = plans.len(),
        "Interactions planned"
    );
    plans
}
