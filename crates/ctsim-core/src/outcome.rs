//! Compiling a terminal state into a [`SimulationResult`].
//!
//! [`compile`] is pure: the only randomness it uses (the momentum
//! perturbation and the bear-market coin flips) comes from the explicit
//! [`OutcomeNoise`] parameter, so compiling the same state with the same
//! noise always gives the same result.

use ctsim_types::{MarketCondition, PersonaType, PredictedOutcome, SimulationResult};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::state::SimulationState;

/// Source of the classification noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutcomeNoise {
    /// Draw the perturbation and coin flips from a generator seeded with
    /// this value.
    Seeded(u64),
    /// Use this exact momentum perturbation and skip the coin flips.
    Fixed(f64),
}

impl OutcomeNoise {
    /// Seeded noise drawn from another generator.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::Seeded(rng.random())
    }
}

/// Per-regime classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Viral coefficient needed to moon.
    pub moon_viral: f64,
    /// Peak sentiment needed to moon.
    pub moon_sentiment: f64,
    /// Viral coefficient needed for a cult following.
    pub cult_viral: f64,
    /// Adjusted momentum below which the token is dead.
    pub death_momentum: f64,
    /// Lower bound of the momentum perturbation.
    pub noise_low: f64,
    /// Upper bound of the momentum perturbation.
    pub noise_high: f64,
}

impl Thresholds {
    /// Threshold table for a market regime.
    pub const fn for_market(market: MarketCondition) -> Self {
        match market {
            MarketCondition::Bear => Self {
                moon_viral: 3.0,
                moon_sentiment: 0.7,
                cult_viral: 1.5,
                death_momentum: -0.3,
                noise_low: -0.2,
                noise_high: 0.1,
            },
            MarketCondition::Euphoria => Self {
                moon_viral: 1.0,
                moon_sentiment: 0.3,
                cult_viral: 0.5,
                death_momentum: -0.8,
                noise_low: -0.1,
                noise_high: 0.2,
            },
            MarketCondition::Crab | MarketCondition::Bull => Self {
                moon_viral: 2.0,
                moon_sentiment: 0.6,
                cult_viral: 1.0,
                death_momentum: -0.5,
                noise_low: -0.1,
                noise_high: 0.1,
            },
        }
    }
}

/// Momentum at compile time below which the token counts as dead.
const DEAD_AT_COMPILE: f64 = -0.5;

/// Fallback stability when there is too little history for a variance.
const DEFAULT_STABILITY: f64 = 0.5;

/// Fallback FUD resistance when no skeptic ever spoke.
const DEFAULT_FUD_RESISTANCE: f64 = 0.7;

const NO_FUD: &str = "No significant FUD detected";

/// The scalar metrics a classification is made from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Engagement per mention, over 100.
    pub viral_coefficient: f64,
    /// Highest hourly mean sentiment.
    pub peak_sentiment: f64,
    /// One minus the population variance of hourly sentiment.
    pub sentiment_stability: f64,
    /// How well the token stands up to skeptics.
    pub fud_resistance: f64,
    /// Index of the first maximum in the sentiment history.
    pub hours_to_peak: u32,
}

/// Derive the scalar metrics from a state.
#[allow(clippy::cast_precision_loss)]
pub fn metrics(state: &SimulationState) -> Metrics {
    let viral_coefficient =
        state.total_engagement as f64 / state.total_mentions.max(1) as f64 / 100.0;

    let history = &state.sentiment_history;
    let (peak_index, peak_sentiment) = history
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, s)| match best {
            Some((_, top)) if s <= top => best,
            _ => Some((i, s)),
        })
        .unwrap_or((0, 0.0));

    let sentiment_stability = if history.len() > 1 {
        let n = history.len() as f64;
        let mean = history.iter().sum::<f64>() / n;
        let variance = history.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        (1.0 - variance).max(0.0)
    } else {
        DEFAULT_STABILITY
    };

    let skeptic: Vec<f64> = state
        .tweets
        .iter()
        .filter(|t| t.author.kind == PersonaType::Skeptic)
        .map(|t| t.sentiment)
        .collect();
    let fud_resistance = if skeptic.is_empty() {
        DEFAULT_FUD_RESISTANCE
    } else {
        let impact = skeptic.iter().sum::<f64>() / skeptic.len() as f64;
        (0.5 - impact).clamp(0.0, 1.0)
    };

    Metrics {
        viral_coefficient,
        peak_sentiment,
        sentiment_stability,
        fud_resistance,
        hours_to_peak: u32::try_from(peak_index).unwrap_or(u32::MAX),
    }
}

/// What CT ended up calling the token, from the last ten tweets.
pub fn dominant_narrative(state: &SimulationState) -> String {
    let skip = state.tweets.len().saturating_sub(10);
    let recent = state
        .tweets
        .iter()
        .skip(skip)
        .map(|t| t.content.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    if recent.contains("rug") || recent.contains("scam") {
        String::from("Another rug in the making")
    } else if recent.contains("gem") || recent.contains("early") {
        String::from("Hidden gem - early opportunity")
    } else if recent.contains("interesting") {
        String::from("Worth watching")
    } else {
        format!("Generic {} play", state.token.meme_style.as_str())
    }
}

/// The first three clearly negative tweets.
pub fn top_fud_points(state: &SimulationState) -> Vec<String> {
    let fud: Vec<String> = state
        .tweets
        .iter()
        .filter(|t| t.sentiment < -0.3)
        .take(3)
        .map(|t| t.content.clone())
        .collect();
    if fud.is_empty() {
        vec![String::from(NO_FUD)]
    } else {
        fud
    }
}

/// Classify the outcome from metrics, terminal momentum and noise.
///
/// Returns the outcome and its confidence.
pub fn classify(
    metrics: &Metrics,
    momentum: f64,
    market: MarketCondition,
    noise: OutcomeNoise,
) -> (PredictedOutcome, f64) {
    let limits = Thresholds::for_market(market);
    let (perturbation, mut rng) = match noise {
        OutcomeNoise::Seeded(seed) => {
            let mut rng = SmallRng::seed_from_u64(seed);
            let value = rng.random_range(limits.noise_low..=limits.noise_high);
            (value, Some(rng))
        }
        OutcomeNoise::Fixed(value) => (value, None),
    };
    let adjusted = (momentum + perturbation).clamp(-1.0, 1.0);

    if metrics.viral_coefficient > limits.moon_viral
        && metrics.peak_sentiment > limits.moon_sentiment
        && metrics.fud_resistance > 0.6
    {
        return (PredictedOutcome::Moon, (metrics.viral_coefficient / 5.0).min(0.8));
    }
    if metrics.viral_coefficient > limits.cult_viral && adjusted > 0.0 {
        return (PredictedOutcome::CultClassic, 0.5);
    }
    if adjusted < limits.death_momentum {
        let outcome = if metrics.fud_resistance < 0.5 {
            PredictedOutcome::Rug
        } else {
            PredictedOutcome::SlowBleed
        };
        return (outcome, 0.6);
    }

    let bear_bleed = market == MarketCondition::Bear
        && rng.as_mut().is_some_and(|rng| rng.random_bool(0.3));
    if metrics.fud_resistance < 0.4 || bear_bleed {
        let rugged = rng.as_mut().is_some_and(|rng| rng.random_bool(0.3));
        let outcome = if rugged {
            PredictedOutcome::Rug
        } else {
            PredictedOutcome::SlowBleed
        };
        return (outcome, 0.5);
    }

    (PredictedOutcome::PumpAndDump, 0.4)
}

/// Compile the terminal state into an immutable result.
pub fn compile(state: &SimulationState, noise: OutcomeNoise) -> SimulationResult {
    let metrics = metrics(state);
    let (predicted_outcome, confidence) =
        classify(&metrics, state.momentum, state.token.market_condition, noise);

    SimulationResult {
        token: state.token.clone(),
        viral_coefficient: metrics.viral_coefficient,
        peak_sentiment: metrics.peak_sentiment,
        sentiment_stability: metrics.sentiment_stability,
        fud_resistance: metrics.fud_resistance,
        total_mentions: state.total_mentions,
        total_engagement: state.total_engagement,
        influencer_pickups: state.influencer_mentions,
        hours_to_peak: metrics.hours_to_peak,
        hours_to_death: (state.momentum < DEAD_AT_COMPILE).then_some(state.current_hour),
        dominant_narrative: dominant_narrative(state),
        top_fud_points: top_fud_points(state),
        predicted_outcome,
        confidence,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use ctsim_agents::PersonaRegistry;
    use ctsim_types::{InteractionKind, MemeStyle, Token, Tweet};

    use super::*;

    fn push(state: &mut SimulationState, kind: PersonaType, content: &str, sentiment: f64) {
        let registry = PersonaRegistry::builtin();
        let id = state.next_tweet_id();
        state.tweets.push(Tweet {
            id,
            author: Arc::clone(registry.get(kind)),
            content: content.to_owned(),
            hour: state.current_hour,
            likes: 0,
            retweets: 0,
            replies: 0,
            sentiment,
            kind: InteractionKind::Original,
            parent: None,
            thread_depth: 0,
        });
    }

    fn metrics_with(viral: f64, peak: f64, fud: f64) -> Metrics {
        Metrics {
            viral_coefficient: viral,
            peak_sentiment: peak,
            sentiment_stability: 1.0,
            fud_resistance: fud,
            hours_to_peak: 0,
        }
    }

    #[test]
    fn zero_tweet_state_uses_defaults() {
        let state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        let result = compile(&state, OutcomeNoise::Fixed(0.0));
        assert!(result.viral_coefficient.abs() < f64::EPSILON);
        assert!(result.peak_sentiment.abs() < f64::EPSILON);
        assert!((result.sentiment_stability - 0.5).abs() < f64::EPSILON);
        assert!((result.fud_resistance - 0.7).abs() < f64::EPSILON);
        assert_eq!(result.hours_to_peak, 0);
        assert_eq!(result.hours_to_death, None);
        assert_eq!(result.top_fud_points, vec![String::from(NO_FUD)]);
        assert_eq!(result.dominant_narrative, "Generic absurd play");
    }

    #[test]
    fn compile_is_idempotent() {
        let mut state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        push(&mut state, PersonaType::Skeptic, "$FROG is a rug", -0.8);
        state.sentiment_history = vec![0.1, -0.4, 0.3];
        state.total_engagement = 900;
        state.total_mentions = 3;
        state.momentum = -0.2;
        let noise = OutcomeNoise::Seeded(17);
        let first = compile(&state, noise);
        let second = compile(&state, noise);
        assert_eq!(first, second);
    }

    #[test]
    fn metrics_follow_history() {
        let mut state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        state.sentiment_history = vec![0.2, 0.6, 0.6, -0.2];
        state.total_engagement = 12_000;
        state.total_mentions = 40;
        let m = metrics(&state);
        assert!((m.viral_coefficient - 3.0).abs() < 1e-9);
        assert!((m.peak_sentiment - 0.6).abs() < 1e-9);
        assert_eq!(m.hours_to_peak, 1);
        // mean 0.3, variance (0.01 + 0.09 + 0.09 + 0.25) / 4 = 0.11
        assert!((m.sentiment_stability - 0.89).abs() < 1e-9);
    }

    #[test]
    fn fud_resistance_tracks_skeptic_mood() {
        let mut state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        push(&mut state, PersonaType::Skeptic, "rug", -0.8);
        push(&mut state, PersonaType::Skeptic, "meh", -0.2);
        push(&mut state, PersonaType::Degen, "lfg", 0.9);
        // 0.5 - (-0.5)
        assert!((metrics(&state).fud_resistance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn narrative_and_fud_points() {
        let mut state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        push(&mut state, PersonaType::Influencer, "early alpha on $FROG", 0.8);
        assert_eq!(dominant_narrative(&state), "Hidden gem - early opportunity");
        push(&mut state, PersonaType::Skeptic, "$FROG is a SCAM", -0.9);
        assert_eq!(dominant_narrative(&state), "Another rug in the making");
        assert_eq!(top_fud_points(&state), vec![String::from("$FROG is a SCAM")]);

        let mut quiet = SimulationState::new(Token::new("Cat", "CAT", "cats"));
        quiet.token.meme_style = MemeStyle::Cute;
        push(&mut quiet, PersonaType::Whale, "$CAT. interesting", 0.4);
        assert_eq!(dominant_narrative(&quiet), "Worth watching");
    }

    #[test]
    fn moon_needs_all_three_signals() {
        let (outcome, confidence) = classify(
            &metrics_with(4.5, 0.8, 0.7),
            0.5,
            MarketCondition::Crab,
            OutcomeNoise::Fixed(0.0),
        );
        assert_eq!(outcome, PredictedOutcome::Moon);
        assert!((confidence - 0.8).abs() < 1e-9);

        let (outcome, _) = classify(
            &metrics_with(4.5, 0.8, 0.5),
            0.5,
            MarketCondition::Crab,
            OutcomeNoise::Fixed(0.0),
        );
        assert_eq!(outcome, PredictedOutcome::CultClassic);
    }

    #[test]
    fn euphoria_lowers_the_bar() {
        let m = metrics_with(1.5, 0.4, 0.7);
        let fixed = OutcomeNoise::Fixed(0.0);
        assert_eq!(classify(&m, 0.2, MarketCondition::Euphoria, fixed).0, PredictedOutcome::Moon);
        assert_ne!(classify(&m, 0.2, MarketCondition::Crab, fixed).0, PredictedOutcome::Moon);
    }

    #[test]
    fn crashed_momentum_splits_on_fud_resistance() {
        let fixed = OutcomeNoise::Fixed(0.0);
        let (rug, c) = classify(&metrics_with(0.5, 0.1, 0.3), -0.6, MarketCondition::Crab, fixed);
        assert_eq!(rug, PredictedOutcome::Rug);
        assert!((c - 0.6).abs() < 1e-9);
        let (bleed, _) = classify(&metrics_with(0.5, 0.1, 0.8), -0.6, MarketCondition::Crab, fixed);
        assert_eq!(bleed, PredictedOutcome::SlowBleed);
    }

    #[test]
    fn fixed_noise_disables_coin_flips() {
        let fixed = OutcomeNoise::Fixed(0.0);
        let (outcome, confidence) =
            classify(&metrics_with(0.5, 0.1, 0.3), 0.0, MarketCondition::Crab, fixed);
        assert_eq!(outcome, PredictedOutcome::SlowBleed);
        assert!((confidence - 0.5).abs() < 1e-9);
        let (outcome, _) = classify(&metrics_with(0.5, 0.1, 0.7), 0.0, MarketCondition::Bear, fixed);
        assert_eq!(outcome, PredictedOutcome::PumpAndDump);
    }

    #[test]
    fn perturbation_is_reclamped() {
        // Momentum -1.0 with a -0.5 push must still compare as -1.0.
        let (outcome, _) = classify(
            &metrics_with(0.1, 0.0, 0.8),
            -1.0,
            MarketCondition::Euphoria,
            OutcomeNoise::Fixed(-0.5),
        );
        assert_eq!(outcome, PredictedOutcome::SlowBleed);
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let m = metrics_with(0.8, 0.2, 0.6);
        for seed in 0..20 {
            let a = classify(&m, -0.25, MarketCondition::Bear, OutcomeNoise::Seeded(seed));
            let b = classify(&m, -0.25, MarketCondition::Bear, OutcomeNoise::Seeded(seed));
            assert_eq!(a.0, b.0);
        }
    }

    #[test]
    fn hours_to_death_set_when_momentum_crashed() {
        let mut state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        state.current_hour = 18;
        state.momentum = -0.6;
        let result = compile(&state, OutcomeNoise::Fixed(0.0));
        assert_eq!(result.hours_to_death, Some(18));
    }
}
