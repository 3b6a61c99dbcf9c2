//! Which personas post in a given hour.
//!
//! Each persona is an independent Bernoulli trial whose probability starts at
//! `engagement_rate * awareness` and is then reshaped by the market regime
//! and by the token's current momentum.

use std::sync::Arc;

use ctsim_types::{MarketCondition, Persona, PersonaType};
use rand::Rng;

/// Momentum above which everyone gets louder.
const HOT_MOMENTUM: f64 = 0.3;

/// Momentum below which skeptics pile on and everyone else goes quiet.
const COLD_MOMENTUM: f64 = -0.3;

/// Regime multiplier for one archetype.
const fn market_multiplier(market: MarketCondition, kind: PersonaType) -> f64 {
    match (market, kind) {
        (MarketCondition::Bear, PersonaType::Skeptic) => 2.0,
        (MarketCondition::Bear, PersonaType::Degen) => 0.5,
        (MarketCondition::Bear, PersonaType::Influencer) => 0.6,
        (MarketCondition::Bear, _) => 0.7,
        (MarketCondition::Euphoria, PersonaType::Degen) => 2.0,
        (MarketCondition::Euphoria, PersonaType::Skeptic) => 0.4,
        (MarketCondition::Euphoria, _) => 1.5,
        (MarketCondition::Bull, PersonaType::Degen) => 1.5,
        (MarketCondition::Bull, PersonaType::Skeptic) => 0.7,
        (MarketCondition::Bull | MarketCondition::Crab, _) => 1.0,
    }
}

/// Momentum feedback multiplier for one archetype.
fn momentum_multiplier(momentum: f64, kind: PersonaType) -> f64 {
    if momentum > HOT_MOMENTUM {
        1.3
    } else if momentum < COLD_MOMENTUM {
        if kind == PersonaType::Skeptic { 1.5 } else { 0.7 }
    } else {
        1.0
    }
}

/// Activation probability for one persona, clamped to `[0, 1]`.
pub fn activation_rate(
    persona: &Persona,
    awareness: f64,
    momentum: f64,
    market: MarketCondition,
) -> f64 {
    let rate = persona.engagement_rate
        * awareness
        * market_multiplier(market, persona.kind)
        * momentum_multiplier(momentum, persona.kind);
    rate.clamp(0.0, 1.0)
}

/// Draw the personas that post this hour, preserving population order.
///
/// Exactly one uniform draw is consumed per persona so the random stream
/// stays aligned regardless of who activates.
pub fn select_active<R: Rng + ?Sized>(
    population: &[Arc<Persona>],
    awareness: f64,
    momentum: f64,
    market: MarketCondition,
    rng: &mut R,
) -> Vec<Arc<Persona>> {
    population
        .iter()
        .filter(|persona| {
            let rate = activation_rate(persona, awareness, momentum, market);
            rng.random::<f64>() < rate
        })
        .cloned()
        .collect()
}
