//! The hour loop.
//!
//! Each hour runs the same pipeline: activation, a batch of original posts,
//! reply/quote threads against the hottest recent tweets, then the state
//! update. [`SimulationEngine::run`] drives it to completion and compiles
//! the result; the streaming driver and the competition coordinator reuse
//! [`SimulationEngine::step`] with their own loops.

use std::sync::Arc;

use ctsim_agents::{PersonaRegistry, select_active, templates};
use ctsim_types::{InteractionKind, Persona, PersonaType, SimulationResult, Token, Tweet};
use rand::Rng;
use tracing::{debug, info};

use crate::generator::{
    Draft, Engagement, INTERACTION_SCALE, InteractionPlan, ORIGINAL_SCALE, TweetGenerator,
    roll_engagement, scale_count,
};
use crate::interaction::{identify_hot_tweets, select_interactions};
use crate::outcome::{OutcomeNoise, compile};
use crate::state::SimulationState;
use crate::update::apply;

/// Attention modifier below which a competitor loses posters and reach.
pub const LOSING_ATTENTION: f64 = 0.8;

/// Attention modifier above which a competitor gains reach.
pub const WINNING_ATTENTION: f64 = 1.2;

/// Knobs that shape a run beyond the token itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// Whether the KOL extension set joins the population.
    pub include_kols: bool,
    /// When set, only this many randomly chosen KOLs join.
    pub kol_sample: Option<usize>,
    /// When set, a fixed outcome perturbation; otherwise seeded from the run.
    pub outcome_noise: Option<f64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            include_kols: true,
            kol_sample: None,
            outcome_noise: None,
        }
    }
}

/// Tweets produced in one hour, before they are applied.
#[derive(Debug, Clone, Default)]
pub struct HourTweets {
    /// Original posts, in activation order.
    pub originals: Vec<Tweet>,
    /// Replies and quotes, in plan order.
    pub interactions: Vec<Tweet>,
}

impl HourTweets {
    /// Every tweet of the hour, originals first.
    pub fn into_vec(self) -> Vec<Tweet> {
        let mut all = self.originals;
        all.extend(self.interactions);
        all
    }

    /// Number of tweets in the hour.
    pub fn len(&self) -> usize {
        self.originals.len().saturating_add(self.interactions.len())
    }

    /// Whether nobody posted.
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty() && self.interactions.is_empty()
    }
}

/// Runs simulations against a persona catalog with a tweet generator.
#[derive(Debug)]
pub struct SimulationEngine<'r, G> {
    registry: &'r PersonaRegistry,
    generator: G,
    options: EngineOptions,
}

impl<'r, G: TweetGenerator> SimulationEngine<'r, G> {
    /// Create an engine with default options.
    pub fn new(registry: &'r PersonaRegistry, generator: G) -> Self {
        Self {
            registry,
            generator,
            options: EngineOptions::default(),
        }
    }

    /// Replace the engine options.
    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// The persona catalog.
    pub const fn registry(&self) -> &'r PersonaRegistry {
        self.registry
    }

    /// The tweet generator.
    pub const fn generator(&self) -> &G {
        &self.generator
    }

    /// The engine options.
    pub const fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The personas that take part in a run.
    pub fn population<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Arc<Persona>> {
        match (self.options.include_kols, self.options.kol_sample) {
            (false, _) => self.registry.all(false),
            (true, None) => self.registry.all(true),
            (true, Some(n)) => self.registry.population_with_sample(n, rng),
        }
    }

    /// Classification noise for a compile at the end of a run.
    pub fn outcome_noise<R: Rng + ?Sized>(&self, rng: &mut R) -> OutcomeNoise {
        self.options
            .outcome_noise
            .map_or_else(|| OutcomeNoise::from_rng(rng), OutcomeNoise::Fixed)
    }

    /// Post and apply the bot alert that opens every run.
    ///
    /// Returns the seed tweet as posted; the state ends at hour 1.
    pub async fn seed<R: Rng + ?Sized>(&self, state: &mut SimulationState, rng: &mut R) -> Tweet {
        let bot = Arc::clone(self.registry.get(PersonaType::Bot));
        let drafts = self
            .generator
            .generate_batch(std::slice::from_ref(&bot), &state.token, state, "", rng)
            .await;
        let draft = drafts
            .into_iter()
            .next()
            .unwrap_or_else(|| Draft::new(templates::bot_alert(&state.token.ticker, rng), 0.0));
        let engagement = roll_engagement(bot.influence_score, state.momentum, ORIGINAL_SCALE, rng);
        let tweet = original_tweet(state, bot, draft, engagement);
        apply(state, vec![tweet.clone()]);
        tweet
    }

    /// Produce one hour of tweets without applying them.
    ///
    /// `attention` is the competition modifier for this token, if any: below
    /// [`LOSING_ATTENTION`] the active list is cut to `floor(len * attention)`
    /// and likes/retweets shrink by 20%; above [`WINNING_ATTENTION`] they
    /// grow by 20%.
    pub async fn step<R: Rng + ?Sized>(
        &self,
        state: &mut SimulationState,
        population: &[Arc<Persona>],
        attention: Option<f64>,
        rng: &mut R,
    ) -> HourTweets {
        let mut active = select_active(
            population,
            state.awareness,
            state.momentum,
            state.token.market_condition,
            rng,
        );
        if let Some(modifier) = attention.filter(|m| *m < LOSING_ATTENTION) {
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss
            )]
            let keep = (active.len() as f64 * modifier).floor().max(0.0) as usize;
            active.truncate(keep);
        }

        let context = state.recent_context();
        let drafts = self
            .generator
            .generate_batch(&active, &state.token, state, &context, rng)
            .await;
        let mut drafts = drafts.into_iter();
        let mut originals = Vec::with_capacity(active.len());
        for persona in active {
            let draft = drafts.next().unwrap_or_else(|| {
                Draft::from(templates::original(persona.kind, &state.token.ticker, rng))
            });
            let engagement =
                roll_engagement(persona.influence_score, state.momentum, ORIGINAL_SCALE, rng);
            originals.push(original_tweet(state, persona, draft, engagement));
        }

        let plans = {
            let hot = identify_hot_tweets(state);
            select_interactions(state, &hot, population, rng)
        };
        let drafts = self
            .generator
            .generate_interactions(&plans, &state.token, state, rng)
            .await;
        let mut drafts = drafts.into_iter();
        let mut interactions = Vec::with_capacity(plans.len());
        for plan in plans {
            let draft = drafts.next().unwrap_or_else(|| {
                Draft::from(templates::interaction(
                    plan.persona.kind,
                    plan.kind,
                    &state.token.ticker,
                    &plan.target_author.handle,
                    rng,
                ))
            });
            let engagement = roll_engagement(
                plan.persona.influence_score,
                state.momentum,
                INTERACTION_SCALE,
                rng,
            );
            interactions.push(interaction_tweet(state, plan, draft, engagement));
        }

        let mut hour = HourTweets {
            originals,
            interactions,
        };
        if let Some(modifier) = attention {
            scale_attention(&mut hour, modifier);
        }
        hour
    }

    /// Run a simulation to completion.
    ///
    /// The seed alert occupies hour 0; hours `1..hours` follow, stopping
    /// early if the token dies. With `verbose`, hour progress is logged at
    /// `info` instead of `debug`.
    pub async fn run<R: Rng + ?Sized>(
        &self,
        token: &Token,
        hours: u32,
        verbose: bool,
        rng: &mut R,
    ) -> SimulationResult {
        let mut state = SimulationState::new(token.clone());
        let population = self.population(rng);
        self.seed(&mut state, rng).await;

        for hour in 1..hours {
            let tweets = self.step(&mut state, &population, None, rng).await;
            let posted = tweets.len();
            apply(&mut state, tweets.into_vec());

            if verbose {
                info!(hour, posted, momentum = state.momentum, awareness = state.awareness, "Hour complete");
            } else {
                debug!(hour, posted, momentum = state.momentum, awareness = state.awareness, "Hour complete");
            }

            if state.is_dead(hour) {
                info!(ticker = %token.ticker, hour, "Token died");
                break;
            }
        }

        let result = compile(&state, self.outcome_noise(rng));
        info!(
            ticker = %token.ticker,
            outcome = %result.predicted_outcome,
            viral = result.viral_coefficient,
            mentions = result.total_mentions,
            "Simulation complete"
        );
        result
    }

    /// Blocking form of [`Self::run`] for generators that need no runtime.
    pub fn run_blocking<R: Rng + ?Sized>(
        &self,
        token: &Token,
        hours: u32,
        verbose: bool,
        rng: &mut R,
    ) -> SimulationResult {
        futures::executor::block_on(self.run(token, hours, verbose, rng))
    }
}

// ---------------------------------------------------------------------------
// Tweet assembly
// ---------------------------------------------------------------------------

fn original_tweet(
    state: &mut SimulationState,
    author: Arc<Persona>,
    draft: Draft,
    engagement: Engagement,
) -> Tweet {
    Tweet {
        id: state.next_tweet_id(),
        author,
        content: draft.content,
        hour: state.current_hour,
        likes: engagement.likes,
        retweets: engagement.retweets,
        replies: engagement.replies,
        sentiment: draft.sentiment,
        kind: InteractionKind::Original,
        parent: None,
        thread_depth: 0,
    }
}

fn interaction_tweet(
    state: &mut SimulationState,
    plan: InteractionPlan,
    draft: Draft,
    engagement: Engagement,
) -> Tweet {
    Tweet {
        id: state.next_tweet_id(),
        author: plan.persona,
        content: draft.content,
        hour: state.current_hour,
        likes: engagement.likes,
        retweets: engagement.retweets,
        replies: engagement.replies,
        sentiment: draft.sentiment,
        kind: plan.kind,
        parent: Some(plan.target),
        thread_depth: plan.depth,
    }
}

fn scale_attention(hour: &mut HourTweets, modifier: f64) {
    let factor = if modifier > WINNING_ATTENTION {
        1.2
    } else if modifier < LOSING_ATTENTION {
        0.8
    } else {
        return;
    };
    for tweet in hour.originals.iter_mut().chain(hour.interactions.iter_mut()) {
        tweet.likes = scale_count(tweet.likes, factor);
        tweet.retweets = scale_count(tweet.retweets, factor);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ctsim_types::{MAX_THREAD_DEPTH, MarketCondition};
    use futures::executor::block_on;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::generator::TemplateGenerator;

    fn token() -> Token {
        Token::new("Frog", "FROG", "frogs on chain")
    }

    #[test]
    fn seed_posts_a_bot_alert_at_hour_zero() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let mut state = SimulationState::new(token());
        let mut rng = SmallRng::seed_from_u64(42);
        let seed = block_on(engine.seed(&mut state, &mut rng));
        assert_eq!(seed.hour, 0);
        assert_eq!(seed.author.kind, PersonaType::Bot);
        assert!(seed.content.starts_with("🚨 NEW TOKEN: $FROG"));
        assert_eq!(state.current_hour, 1);
        assert_eq!(state.tweets.len(), 1);
    }

    #[test]
    fn step_stamps_current_hour_and_bounds_depth() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let mut state = SimulationState::new(token().with_market(MarketCondition::Euphoria));
        let mut rng = SmallRng::seed_from_u64(7);
        let population = engine.population(&mut rng);
        block_on(engine.seed(&mut state, &mut rng));
        state.awareness = 1.0;

        for _ in 0..12 {
            let hour = state.current_hour;
            let tweets = block_on(engine.step(&mut state, &population, None, &mut rng));
            for t in tweets.originals.iter().chain(tweets.interactions.iter()) {
                assert_eq!(t.hour, hour);
                assert!(t.thread_depth <= MAX_THREAD_DEPTH);
            }
            for t in &tweets.interactions {
                assert!(t.parent.is_some());
                assert_ne!(t.kind, InteractionKind::Original);
            }
            apply(&mut state, tweets.into_vec());
        }
    }

    #[test]
    fn losing_attention_truncates_to_nothing_at_zero() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let mut state = SimulationState::new(token());
        state.awareness = 1.0;
        let mut rng = SmallRng::seed_from_u64(1);
        let population = registry.all(false);
        let tweets = block_on(engine.step(&mut state, &population, Some(0.0), &mut rng));
        assert!(tweets.originals.is_empty());
    }

    #[test]
    fn attention_scaling_floors_likes_and_retweets() {
        let registry = PersonaRegistry::builtin();
        let mut hour = HourTweets::default();
        hour.originals.push(Tweet {
            id: ctsim_types::TweetId::new(0),
            author: Arc::clone(registry.get(PersonaType::Degen)),
            content: String::from("$FROG"),
            hour: 1,
            likes: 10,
            retweets: 5,
            replies: 3,
            sentiment: 0.5,
            kind: InteractionKind::Original,
            parent: None,
            thread_depth: 0,
        });
        scale_attention(&mut hour, 1.5);
        let t = hour.originals.first().unwrap();
        assert_eq!((t.likes, t.retweets, t.replies), (12, 6, 3));
        scale_attention(&mut hour, 1.0);
        let t = hour.originals.first().unwrap();
        assert_eq!((t.likes, t.retweets), (12, 6));
        scale_attention(&mut hour, 0.5);
        let t = hour.originals.first().unwrap();
        assert_eq!((t.likes, t.retweets), (9, 4));
    }

    #[test]
    fn population_respects_options() {
        let registry = PersonaRegistry::builtin();
        let mut rng = SmallRng::seed_from_u64(3);
        let all = SimulationEngine::new(&registry, TemplateGenerator::new());
        assert_eq!(all.population(&mut rng).len(), registry.all(true).len());

        let base = SimulationEngine::new(&registry, TemplateGenerator::new()).with_options(
            EngineOptions {
                include_kols: false,
                ..EngineOptions::default()
            },
        );
        assert_eq!(base.population(&mut rng).len(), PersonaType::BASE.len());

        let sampled = SimulationEngine::new(&registry, TemplateGenerator::new()).with_options(
            EngineOptions {
                kol_sample: Some(2),
                ..EngineOptions::default()
            },
        );
        assert_eq!(sampled.population(&mut rng).len(), PersonaType::BASE.len() + 2);
    }

    #[test]
    fn run_is_deterministic_under_seed() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let mut a = SmallRng::seed_from_u64(99);
        let mut b = SmallRng::seed_from_u64(99);
        let first = engine.run_blocking(&token(), 24, false, &mut a);
        let second = engine.run_blocking(&token(), 24, false, &mut b);
        assert_eq!(first, second);
    }

    #[test]
    fn run_bounds_hold() {
        let registry = PersonaRegistry::builtin();
        let engine = SimulationEngine::new(&registry, TemplateGenerator::new());
        let mut rng = SmallRng::seed_from_u64(5);
        let result = engine.run_blocking(&token().with_market(MarketCondition::Bull), 48, true, &mut rng);
        assert!((0.0..=1.0).contains(&result.fud_resistance));
        assert!((0.0..=1.0).contains(&result.sentiment_stability));
        assert!((0.0..=1.0).contains(&result.confidence));
        assert!(result.total_mentions >= 1);
    }
}
