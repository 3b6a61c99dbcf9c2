//! Streaming driver: a run as an ordered, lazy event sequence.
//!
//! The stream yields the seed tweet and an hour-0 progress snapshot, then
//! for every hour a progress event followed by that hour's tweets (original
//! posts first, then replies and quotes). A death or an external stop adds
//! a status event; the final event is always the compiled result. Nothing
//! runs until the stream is polled, and it cannot be restarted.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ctsim_types::{Persona, ProgressEvent, SimulationEvent, Token, TweetEvent};
use futures::Stream;
use rand::Rng;
use tracing::info;

use crate::engine::SimulationEngine;
use crate::generator::TweetGenerator;
use crate::outcome::compile;
use crate::state::SimulationState;
use crate::update::apply;

/// Cooperative cancellation flag shared between a caller and a stream.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// A signal that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the stream to stop before its next hour.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`Self::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn progress(state: &SimulationState, hour: u32, total_hours: u32) -> SimulationEvent {
    SimulationEvent::Progress(ProgressEvent {
        hour,
        total_hours,
        momentum: round3(state.momentum),
        awareness: round3(state.awareness),
        tweet_count: state.tweet_count(),
    })
}

enum Phase {
    Start,
    Hour(u32),
    Finish,
    Done,
}

struct Driver<'e, 'r, G, R> {
    engine: &'e SimulationEngine<'r, G>,
    state: SimulationState,
    population: Vec<Arc<Persona>>,
    hours: u32,
    stop: StopSignal,
    rng: R,
    phase: Phase,
    pending: VecDeque<SimulationEvent>,
}

impl<G: TweetGenerator, R: Rng> Driver<'_, '_, G, R> {
    async fn next_event(&mut self) -> Option<SimulationEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            match self.phase {
                Phase::Start => self.start().await,
                Phase::Hour(hour) => self.hour(hour).await,
                Phase::Finish => self.finish(),
                Phase::Done => return None,
            }
        }
    }

    async fn start(&mut self) {
        self.population = self.engine.population(&mut self.rng);
        let seed = self.engine.seed(&mut self.state, &mut self.rng).await;
        self.pending.push_back(SimulationEvent::Tweet {
            tweet: TweetEvent::from(&seed),
        });
        self.pending.push_back(progress(&self.state, 0, self.hours));
        self.phase = Phase::Hour(1);
    }

    async fn hour(&mut self, hour: u32) {
        if hour >= self.hours {
            self.phase = Phase::Finish;
            return;
        }
        if self.stop.is_stopped() {
            info!(ticker = %self.state.token.ticker, hour, "Stream stopped");
            self.pending.push_back(SimulationEvent::Status {
                message: format!("Simulation stopped at hour {hour}"),
            });
            self.phase = Phase::Finish;
            return;
        }

        let tweets = self
            .engine
            .step(&mut self.state, &self.population, None, &mut self.rng)
            .await;
        let events: Vec<SimulationEvent> = tweets
            .originals
            .iter()
            .chain(tweets.interactions.iter())
            .map(|t| SimulationEvent::Tweet {
                tweet: TweetEvent::from(t),
            })
            .collect();
        apply(&mut self.state, tweets.into_vec());

        self.pending.push_back(progress(&self.state, hour, self.hours));
        self.pending.extend(events);

        if self.state.is_dead(hour) {
            info!(ticker = %self.state.token.ticker, hour, "Token died");
            self.pending.push_back(SimulationEvent::Status {
                message: format!("Token died at hour {hour}"),
            });
            self.phase = Phase::Finish;
        } else {
            self.phase = Phase::Hour(hour.saturating_add(1));
        }
    }

    fn finish(&mut self) {
        let noise = self.engine.outcome_noise(&mut self.rng);
        let result = compile(&self.state, noise);
        self.pending.push_back(SimulationEvent::Result {
            result: Box::new(result),
        });
        self.phase = Phase::Done;
    }
}

impl<'r, G: TweetGenerator> SimulationEngine<'r, G> {
    /// Run a simulation as a lazy event stream.
    ///
    /// The stream owns its random source and checks `stop` before every
    /// hour; a stopped stream still ends with a status and a result.
    pub fn run_stream<'a, R: Rng + 'a>(
        &'a self,
        token: &Token,
        hours: u32,
        stop: StopSignal,
        rng: R,
    ) -> impl Stream<Item = SimulationEvent> + use<'a, 'r, G, R> {
        let driver = Driver {
            engine: self,
            state: SimulationState::new(token.clone()),
            population: Vec::new(),
            hours,
            stop,
            rng,
            phase: Phase::Start,
            pending: VecDeque::new(),
        };
        futures::stream::unfold(driver, |mut driver| async move {
            let event = driver.next_event().await?;
            Some((event, driver))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ctsim_agents::PersonaRegistry;
    use ctsim_types::MarketCondition;
    use futures::StreamExt;
    use futures::executor::block_on;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::generator::TemplateGenerator;

    fn collect(engine: &SimulationEngine<'_, TemplateGenerator>, hours: u32, stop: StopSignal, seed: u64) -> Vec<SimulationEvent> {
        let token = Token::new("Frog", "FROG", "frogs").with_market(MarketCondition::Bull);
        block_on(
            engine
                .run_stream(&token, hours, stop, SmallRng::seed_from_u64(seed))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn stream_opens_with_seed_and_hour_zero() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let events = collect(&engine, 6, StopSignal::new(), 42);
        assert!(matches!(events.first(), Some(SimulationEvent::Tweet { .. })));
        match events.get(1) {
            Some(SimulationEvent::Progress(p)) => {
                assert_eq!(p.hour, 0);
                assert_eq!(p.total_hours, 6);
                assert_eq!(p.tweet_count, 1);
            }
            other => panic!("expected progress, got {other:?}"),
        }
        assert!(events.last().unwrap().is_terminal());
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[test]
    fn progress_hours_are_consecutive_and_tweets_follow_their_hour() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let events = collect(&engine, 10, StopSignal::new(), 7);
        let mut current = 0;
        let mut seen_progress = Vec::new();
        for event in events.iter().skip(1) {
            match event {
                SimulationEvent::Progress(p) => {
                    current = p.hour;
                    seen_progress.push(p.hour);
                }
                SimulationEvent::Tweet { tweet } => assert_eq!(tweet.hour, current),
                _ => {}
            }
        }
        assert_eq!(seen_progress, (0..10).collect::<Vec<u32>>());
    }

    #[test]
    fn stopped_stream_reports_and_still_compiles() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let stop = StopSignal::new();
        stop.stop();
        let events = collect(&engine, 24, stop, 1);
        assert_eq!(events.len(), 4);
        match events.get(2) {
            Some(SimulationEvent::Status { message }) => {
                assert_eq!(message, "Simulation stopped at hour 1");
            }
            other => panic!("expected status, got {other:?}"),
        }
        assert!(events.get(3).unwrap().is_terminal());
    }

    #[test]
    fn identical_seeds_give_identical_streams() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let a = collect(&engine, 16, StopSignal::new(), 1234);
        let b = collect(&engine, 16, StopSignal::new(), 1234);
        assert_eq!(a, b);
    }

    #[test]
    fn stream_borrows_its_rng_but_not_the_token() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let mut rng = SmallRng::seed_from_u64(1234);
        let stream = {
            let token = Token::new("Frog", "FROG", "frogs").with_market(MarketCondition::Bull);
            engine.run_stream(&token, 16, StopSignal::new(), &mut rng)
        };
        let borrowed: Vec<SimulationEvent> = block_on(stream.collect());
        assert_eq!(borrowed, collect(&engine, 16, StopSignal::new(), 1234));
    }
}
