//! Prompt template loading and rendering via `minijinja`.
//!
//! Four templates make up a request: `tweet_system` and `tweet` for a batch
//! of original posts, `interaction_system` and `interaction` for replies and
//! quotes. Built-in versions are compiled in; [`PromptEngine::from_dir`]
//! loads overrides so operators can tune the voice without recompiling.

use ctsim_core::{InteractionPlan, SimulationState};
use ctsim_types::Token;
use minijinja::{Environment, context};

use crate::error::RunnerError;

const TWEET_SYSTEM: &str = r#"You write tweets for {{ count }} Crypto Twitter accounts reacting to ${{ ticker }}.
Each account has its own voice, described in its brief. Keep every tweet under 280 characters.
Respond with JSON only, one record per account:
{% raw %}{"tweets": [{"handle": "<handle>", "content": "<tweet>", "sentiment": <number from -1 to 1>}]}{% endraw %}"#;

const TWEET: &str = r"New token just dropped:

{{ pitch }}

Market condition: {{ market }}
Current CT sentiment: {{ mood }}
Awareness level: {{ awareness_pct }}% of CT knows about it
{% if context %}
Context from other tweets:
{{ context }}
{% endif %}
React to this token. Stay in character. One tweet per account.";

const INTERACTION_SYSTEM: &str = r#"You write replies and quote tweets about ${{ ticker }} for {{ count }} Crypto Twitter accounts.
Answer every request in the voice of the account's brief. Keep every tweet under 280 characters.
Respond with JSON only, one record per request, echoing the request's id and handle:
{% raw %}{"tweets": [{"id": <request id>, "handle": "<handle>", "content": "<tweet>", "sentiment": <number from -1 to 1>}]}{% endraw %}"#;

const INTERACTION: &str = r#"{% if kind == "quote" %}Quote tweet{% else %}Reply to{% endif %} this tweet from @{{ target_handle }} about ${{ ticker }}:

"{{ target_content }}"

Market condition: {{ market }}. Stay in character. One tweet only."#;

const NAMES: [&str; 4] = ["tweet_system", "tweet", "interaction_system", "interaction"];

/// Renders batch prompts from `minijinja` templates.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl std::fmt::Debug for PromptEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptEngine").finish_non_exhaustive()
    }
}

impl PromptEngine {
    /// Create an engine with the built-in templates.
    pub fn new() -> Result<Self, RunnerError> {
        Self::from_sources([TWEET_SYSTEM, TWEET, INTERACTION_SYSTEM, INTERACTION].map(str::to_owned))
    }

    /// Create an engine from `<name>.j2` files in `dir`.
    ///
    /// Any of `tweet_system.j2`, `tweet.j2`, `interaction_system.j2` and
    /// `interaction.j2` that is missing keeps its built-in version.
    pub fn from_dir(dir: &str) -> Result<Self, RunnerError> {
        Self::from_sources([
            load_template(dir, "tweet_system", TWEET_SYSTEM)?,
            load_template(dir, "tweet", TWEET)?,
            load_template(dir, "interaction_system", INTERACTION_SYSTEM)?,
            load_template(dir, "interaction", INTERACTION)?,
        ])
    }

    fn from_sources(sources: [String; 4]) -> Result<Self, RunnerError> {
        let mut env = Environment::new();
        for (name, source) in NAMES.into_iter().zip(sources) {
            env.add_template_owned(name, source)
                .map_err(|source| RunnerError::Template {
                    name: name.to_owned(),
                    source,
                })?;
        }
        Ok(Self { env })
    }

    /// Batch instructions for `count` original posts.
    pub fn tweet_system(&self, token: &Token, count: usize) -> Result<String, RunnerError> {
        self.render("tweet_system", context! { ticker => &token.ticker, count })
    }

    /// Token pitch, market mood and recent timeline for an original batch.
    pub fn tweet_context(
        &self,
        token: &Token,
        state: &SimulationState,
        timeline: &str,
    ) -> Result<String, RunnerError> {
        self.render(
            "tweet",
            context! {
                pitch => token.pitch(),
                market => token.market_condition.as_str(),
                mood => state.mood(),
                awareness_pct => format!("{:.0}", state.awareness * 100.0),
                context => timeline,
            },
        )
    }

    /// Batch instructions for `count` replies and quotes.
    pub fn interaction_system(&self, token: &Token, count: usize) -> Result<String, RunnerError> {
        self.render("interaction_system", context! { ticker => &token.ticker, count })
    }

    /// The request text for one planned interaction.
    pub fn interaction(&self, plan: &InteractionPlan, token: &Token) -> Result<String, RunnerError> {
        self.render(
            "interaction",
            context! {
                kind => plan.kind,
                target_handle => &plan.target_author.handle,
                target_content => &plan.target_content,
                ticker => &token.ticker,
                market => token.market_condition.as_str(),
            },
        )
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, RunnerError> {
        let wrap = |source| RunnerError::Template {
            name: name.to_owned(),
            source,
        };
        self.env.get_template(name).map_err(wrap)?.render(ctx).map_err(wrap)
    }
}

/// Read `<dir>/<name>.j2`, keeping `fallback` when the file does not exist.
fn load_template(dir: &str, name: &str, fallback: &str) -> Result<String, RunnerError> {
    let path = format!("{dir}/{name}.j2");
    match std::fs::read_to_string(&path) {
        Ok(source) => Ok(source),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(fallback.to_owned()),
        Err(source) => Err(RunnerError::TemplateIo { path, source }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use ctsim_agents::PersonaRegistry;
    use ctsim_types::{InteractionKind, MarketCondition, PersonaType, TweetId};

    use super::*;

    fn token() -> Token {
        Token::new("Pepe Classic", "PEPEC", "the original frog returns").with_market(MarketCondition::Bull)
    }

    #[test]
    fn tweet_context_carries_pitch_mood_and_timeline() {
        let engine = PromptEngine::new().unwrap();
        let mut state = SimulationState::new(token());
        state.momentum = 0.5;
        state.awareness = 0.25;

        let text = engine
            .tweet_context(&token(), &state, "@degen: $PEPEC lfg")
            .unwrap();
        assert!(text.contains("$PEPEC - Pepe Classic"));
        assert!(text.contains("Market condition: bull"));
        assert!(text.contains("Current CT sentiment: bullish"));
        assert!(text.contains("Awareness level: 25% of CT"));
        assert!(text.contains("@degen: $PEPEC lfg"));
    }

    #[test]
    fn empty_timeline_omits_context_block() {
        let engine = PromptEngine::new().unwrap();
        let state = SimulationState::new(token());
        let text = engine.tweet_context(&token(), &state, "").unwrap();
        assert!(!text.contains("Context from other tweets"));
    }

    #[test]
    fn system_prompt_shows_json_shape() {
        let engine = PromptEngine::new().unwrap();
        let text = engine.tweet_system(&token(), 3).unwrap();
        assert!(text.contains("for 3 Crypto Twitter accounts"));
        assert!(text.contains(r#"{"tweets": [{"handle""#));
    }

    #[test]
    fn interaction_system_asks_for_request_ids() {
        let engine = PromptEngine::new().unwrap();
        let text = engine.interaction_system(&token(), 2).unwrap();
        assert!(text.contains(r#"{"tweets": [{"id": <request id>, "handle""#));
    }

    #[test]
    fn interaction_prompt_names_target() {
        let registry = PersonaRegistry::builtin();
        let plan = InteractionPlan {
            persona: Arc::clone(registry.get(PersonaType::Skeptic)),
            target: TweetId::new(3),
            target_author: Arc::clone(registry.get(PersonaType::Degen)),
            target_content: "$PEPEC to the moon".to_owned(),
            target_sentiment: 0.9,
            kind: InteractionKind::Quote,
            depth: 1,
        };
        let engine = PromptEngine::new().unwrap();
        let text = engine.interaction(&plan, &token()).unwrap();
        assert!(text.starts_with("Quote tweet this tweet from @"));
        assert!(text.contains(&registry.get(PersonaType::Degen).handle));
        assert!(text.contains("\"$PEPEC to the moon\""));
    }

    #[test]
    fn missing_override_dir_keeps_builtins() {
        let engine = PromptEngine::from_dir("/nonexistent/ctsim-templates").unwrap();
        assert!(engine.interaction_system(&token(), 2).unwrap().contains("$PEPEC"));
    }
}
