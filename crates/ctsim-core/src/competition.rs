//! Several launches competing for the same attention.
//!
//! Every token gets its own state and its own random stream, but they share
//! one hour loop. Each hour the tokens' momenta decide how attention is
//! split: tokens losing the split get fewer posters and less reach, tokens
//! winning it get more reach. Every fourth hour a clear leader pulls a
//! little further ahead of the laggard.

use std::sync::Arc;

use ctsim_types::{Persona, SimulationResult, Token};
use futures::future::join_all;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::engine::SimulationEngine;
use crate::generator::TweetGenerator;
use crate::outcome::compile;
use crate::state::SimulationState;
use crate::update::apply;

/// Fewest tokens in a competition.
pub const MIN_COMPETITORS: usize = 2;

/// Most tokens in a competition.
pub const MAX_COMPETITORS: usize = 4;

/// How often (in hours) the leader/laggard nudge runs.
const NUDGE_EVERY: u32 = 4;

/// Momentum spread that counts as a clear leader.
const NUDGE_SPREAD: f64 = 0.3;

/// Momentum moved by one nudge.
const NUDGE: f64 = 0.05;

/// Errors returned by [`CompetitionCoordinator::run`].
#[derive(Debug, thiserror::Error)]
pub enum CompetitionError {
    /// Too few or too many tokens.
    #[error("a competition needs 2 to 4 tokens, got {count}")]
    FieldSize {
        /// Number of tokens supplied.
        count: usize,
    },
}

/// Attention modifier per token: its share of the split relative to an
/// even split.
///
/// Each token weighs `max(0.1, momentum + 0.5)`.
#[allow(clippy::cast_precision_loss)]
pub fn attention_modifiers(momenta: &[f64]) -> Vec<f64> {
    let weights: Vec<f64> = momenta.iter().map(|m| (m + 0.5).max(0.1)).collect();
    let total: f64 = weights.iter().sum();
    let n = weights.len() as f64;
    weights.iter().map(|w| w / total * n).collect()
}

/// Push the leader up and the laggard down when the spread is wide.
///
/// Extremes are tracked by position; ties resolve to the first token.
pub fn nudge_extremes(states: &mut [SimulationState]) {
    let mut leader: Option<(usize, f64)> = None;
    let mut laggard: Option<(usize, f64)> = None;
    for (i, state) in states.iter().enumerate() {
        let m = state.momentum;
        if leader.is_none_or(|(_, top)| m > top) {
            leader = Some((i, m));
        }
        if laggard.is_none_or(|(_, low)| m < low) {
            laggard = Some((i, m));
        }
    }
    let (Some((lead, top)), Some((lag, low))) = (leader, laggard) else {
        return;
    };
    if top - low <= NUDGE_SPREAD {
        return;
    }
    if let Some(state) = states.get_mut(lead) {
        state.momentum = (state.momentum + NUDGE).min(1.0);
    }
    if let Some(state) = states.get_mut(lag) {
        state.momentum = (state.momentum - NUDGE).max(-1.0);
    }
    debug!(leader = lead, laggard = lag, spread = top - low, "Competition nudge");
}

/// One-line verdict naming the token with the best viral coefficient.
pub fn analyze(results: &[SimulationResult]) -> String {
    let winner = results.iter().fold(None, |best: Option<&SimulationResult>, r| match best {
        Some(b) if r.viral_coefficient <= b.viral_coefficient => best,
        _ => Some(r),
    });
    winner.map_or_else(
        || String::from("No tokens competed."),
        |w| {
            format!(
                "${} dominated the competition with superior viral coefficient and engagement.",
                w.token.ticker
            )
        },
    )
}

/// Runs 2 to 4 tokens against each other under one hour loop.
#[derive(Debug)]
pub struct CompetitionCoordinator<'e, 'r, G> {
    engine: &'e SimulationEngine<'r, G>,
}

impl<'e, 'r, G: TweetGenerator> CompetitionCoordinator<'e, 'r, G> {
    /// Create a coordinator that drives `engine`.
    pub const fn new(engine: &'e SimulationEngine<'r, G>) -> Self {
        Self { engine }
    }

    /// Run the competition; results come back in token order.
    ///
    /// Each token draws from its own generator seeded from `rng`, so the
    /// order in which members are polled cannot change the outcome.
    pub async fn run<R: Rng + ?Sized>(
        &self,
        tokens: &[Token],
        hours: u32,
        rng: &mut R,
    ) -> Result<Vec<SimulationResult>, CompetitionError> {
        if !(MIN_COMPETITORS..=MAX_COMPETITORS).contains(&tokens.len()) {
            return Err(CompetitionError::FieldSize {
                count: tokens.len(),
            });
        }
        let engine = self.engine;

        let mut rngs: Vec<SmallRng> = tokens
            .iter()
            .map(|_| SmallRng::seed_from_u64(rng.random()))
            .collect();
        let mut states: Vec<SimulationState> =
            tokens.iter().cloned().map(SimulationState::new).collect();
        let populations: Vec<Vec<Arc<Persona>>> =
            rngs.iter_mut().map(|r| engine.population(r)).collect();

        join_all(
            states
                .iter_mut()
                .zip(rngs.iter_mut())
                .map(|(state, r)| engine.seed(state, r)),
        )
        .await;

        for hour in 1..hours {
            let momenta: Vec<f64> = states.iter().map(|s| s.momentum).collect();
            let modifiers = attention_modifiers(&momenta);

            join_all(
                states
                    .iter_mut()
                    .zip(rngs.iter_mut())
                    .zip(populations.iter())
                    .zip(modifiers.iter().copied())
                    .map(|(((state, r), population), modifier)| async move {
                        let tweets = engine.step(state, population, Some(modifier), r).await;
                        apply(state, tweets.into_vec());
                    }),
            )
            .await;

            if hour % NUDGE_EVERY == 0 {
                nudge_extremes(&mut states);
            }
            debug!(hour, ?momenta, ?modifiers, "Competition hour complete");
        }

        let results: Vec<SimulationResult> = states
            .iter()
            .zip(rngs.iter_mut())
            .map(|(state, r)| compile(state, engine.outcome_noise(r)))
            .collect();
        info!(tokens = results.len(), verdict = %analyze(&results), "Competition complete");
        Ok(results)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ctsim_agents::PersonaRegistry;
    use futures::executor::block_on;

    use super::*;
    use crate::generator::TemplateGenerator;

    fn state_with(momentum: f64) -> SimulationState {
        let mut state = SimulationState::new(Token::new("Frog", "FROG", "frogs"));
        state.momentum = momentum;
        state
    }

    #[test]
    fn even_momentum_splits_evenly() {
        let modifiers = attention_modifiers(&[0.0, 0.0, 0.0]);
        assert!(modifiers.iter().all(|m| (m - 1.0).abs() < 1e-9));
    }

    #[test]
    fn weights_have_a_floor() {
        // weights 1.4 and 0.1
        let modifiers = attention_modifiers(&[0.9, -0.9]);
        assert!((modifiers.first().unwrap() - 2.8 / 1.5).abs() < 1e-9);
        assert!((modifiers.get(1).unwrap() - 0.2 / 1.5).abs() < 1e-9);
    }

    #[test]
    fn nudge_moves_first_extremes_only() {
        let mut states = vec![state_with(0.5), state_with(0.5), state_with(-0.1), state_with(-0.1)];
        nudge_extremes(&mut states);
        let momenta: Vec<f64> = states.iter().map(|s| s.momentum).collect();
        let expected = [0.55, 0.5, -0.15, -0.1];
        for (got, want) in momenta.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{momenta:?}");
        }
    }

    #[test]
    fn narrow_spread_is_left_alone() {
        let mut states = vec![state_with(0.2), state_with(0.0)];
        nudge_extremes(&mut states);
        assert!((states.first().unwrap().momentum - 0.2).abs() < 1e-9);
        assert!(states.get(1).unwrap().momentum.abs() < 1e-9);
    }

    #[test]
    fn nudge_respects_bounds() {
        let mut states = vec![state_with(0.98), state_with(-0.99)];
        nudge_extremes(&mut states);
        assert!((states.first().unwrap().momentum - 1.0).abs() < 1e-9);
        assert!((states.get(1).unwrap().momentum + 1.0).abs() < 1e-9);
    }

    #[test]
    fn field_size_is_enforced() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let coordinator = CompetitionCoordinator::new(&engine);
        let mut rng = SmallRng::seed_from_u64(1);
        let one = vec![Token::new("A", "A", "a")];
        let err = block_on(coordinator.run(&one, 12, &mut rng)).unwrap_err();
        assert!(matches!(err, CompetitionError::FieldSize { count: 1 }));
        let five: Vec<Token> = (0..5).map(|i| Token::new("T", format!("T{i}"), "t")).collect();
        assert!(block_on(coordinator.run(&five, 12, &mut rng)).is_err());
    }

    #[test]
    fn results_come_back_in_token_order() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let coordinator = CompetitionCoordinator::new(&engine);
        let tokens = vec![
            Token::new("Alpha", "ALPHA", "first"),
            Token::new("Beta", "BETA", "second"),
            Token::new("Gamma", "GAMMA", "third"),
        ];
        let mut rng = SmallRng::seed_from_u64(42);
        let results = block_on(coordinator.run(&tokens, 12, &mut rng)).unwrap();
        let tickers: Vec<&str> = results.iter().map(|r| r.token.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["ALPHA", "BETA", "GAMMA"]);
    }

    #[test]
    fn analysis_names_the_most_viral_token() {
        let mut a = compile(&state_with(0.0), crate::outcome::OutcomeNoise::Fixed(0.0));
        let mut b = a.clone();
        a.token.ticker = String::from("AAA");
        a.viral_coefficient = 1.0;
        b.token.ticker = String::from("BBB");
        b.viral_coefficient = 2.0;
        assert_eq!(
            analyze(&[a, b]),
            "$BBB dominated the competition with superior viral coefficient and engagement."
        );
        assert_eq!(analyze(&[]), "No tokens competed.");
    }
}
