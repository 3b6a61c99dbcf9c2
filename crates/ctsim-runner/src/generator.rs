//! A [`TweetGenerator`] backed by an external capability.
//!
//! Each hour becomes at most two capability calls: one batch of original
//! posts and one batch of interactions. Records are matched back by handle
//! (originals) or by the request id they echo (interactions), never by where
//! they sit in the response. Whatever the capability
//! fails to deliver, whether an error, a timeout, a malformed payload or a
//! missing record, is filled from the persona's templates, so the hour always
//! gets exactly one draft per input.

use std::collections::HashMap;
use std::sync::Arc;

use ctsim_agents::{estimate_sentiment, templates};
use ctsim_core::{Draft, InteractionPlan, SimulationState, TweetGenerator};
use ctsim_types::{Persona, Token};
use rand::Rng;
use tracing::{debug, warn};

use crate::capability::{
    InteractionRequest, InteractionSpec, PersonaSpec, TimeoutCapability, TweetBatchCapability,
    TweetRequest,
};
use crate::config::CapabilityConfig;
use crate::error::RunnerError;
use crate::parse::{ParsedRecord, parse_records};
use crate::prompt::PromptEngine;

/// Generator that asks a [`TweetBatchCapability`] first and templates second.
#[derive(Debug)]
pub struct CapabilityGenerator<C> {
    capability: C,
    prompts: PromptEngine,
    max_tokens: u32,
}

impl<C: TweetBatchCapability> CapabilityGenerator<C> {
    /// Wrap `capability` with the given prompts and response budget.
    pub const fn new(capability: C, prompts: PromptEngine, max_tokens: u32) -> Self {
        Self {
            capability,
            prompts,
            max_tokens,
        }
    }

    /// Build a generator from runner configuration.
    ///
    /// The capability is wrapped in a [`TimeoutCapability`] with the
    /// configured deadline; prompts come from the configured directory or
    /// the built-in set.
    pub fn from_config(
        capability: C,
        config: &CapabilityConfig,
    ) -> Result<CapabilityGenerator<TimeoutCapability<C>>, RunnerError> {
        let prompts = match &config.templates_dir {
            Some(dir) => PromptEngine::from_dir(dir)?,
            None => PromptEngine::new()?,
        };
        Ok(CapabilityGenerator::new(
            TimeoutCapability::new(capability, config.timeout),
            prompts,
            config.max_tokens,
        ))
    }

    /// The wrapped capability.
    pub const fn capability(&self) -> &C {
        &self.capability
    }

    async fn request_tweets(
        &self,
        personas: &[Arc<Persona>],
        token: &Token,
        state: &SimulationState,
        context: &str,
    ) -> Result<Vec<ParsedRecord>, RunnerError> {
        let request = TweetRequest {
            system_context: self.prompts.tweet_system(token, personas.len())?,
            personas: personas
                .iter()
                .map(|p| PersonaSpec {
                    handle: p.handle.clone(),
                    kind: p.kind,
                    system_prompt: p.system_prompt(),
                })
                .collect(),
            token_context: self.prompts.tweet_context(token, state, context)?,
            max_tokens: self.max_tokens,
        };
        let raw = self.capability.generate_tweets(&request).await?;
        parse_records(&raw)
    }

    async fn request_interactions(
        &self,
        plans: &[InteractionPlan],
        token: &Token,
    ) -> Result<Vec<ParsedRecord>, RunnerError> {
        let interactions = plans
            .iter()
            .enumerate()
            .map(|(id, plan)| {
                Ok(InteractionSpec {
                    id,
                    handle: plan.persona.handle.clone(),
                    system_prompt: plan.persona.system_prompt(),
                    kind: plan.kind,
                    prompt: self.prompts.interaction(plan, token)?,
                })
            })
            .collect::<Result<Vec<_>, RunnerError>>()?;
        let request = InteractionRequest {
            system_context: self.prompts.interaction_system(token, plans.len())?,
            interactions,
            max_tokens: self.max_tokens,
        };
        let raw = self.capability.generate_interactions(&request).await?;
        parse_records(&raw)
    }
}

impl<C: TweetBatchCapability> TweetGenerator for CapabilityGenerator<C> {
    async fn generate_batch<R: Rng + ?Sized>(
        &self,
        personas: &[Arc<Persona>],
        token: &Token,
        state: &SimulationState,
        context: &str,
        rng: &mut R,
    ) -> Vec<Draft> {
        if personas.is_empty() {
            return Vec::new();
        }

        let records = self
            .request_tweets(personas, token, state, context)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, hour = state.current_hour, "tweet batch failed, using templates");
                Vec::new()
            });

        let mut by_handle: HashMap<String, ParsedRecord> = HashMap::new();
        for record in records {
            if let Some(handle) = record.handle.as_deref().map(str::to_ascii_lowercase) {
                by_handle.entry(handle).or_insert(record);
            }
        }

        let mut filled = 0_usize;
        let drafts: Vec<Draft> = personas
            .iter()
            .map(|persona| match by_handle.remove(&persona.handle.to_ascii_lowercase()) {
                Some(record) => draft_from_record(record, persona),
                None => {
                    filled = filled.saturating_add(1);
                    Draft::from(templates::original(persona.kind, &token.ticker, rng))
                }
            })
            .collect();

        log_fill("tweets", state.current_hour, personas.len(), filled);
        drafts
    }

    async fn generate_interactions<R: Rng + ?Sized>(
        &self,
        plans: &[InteractionPlan],
        token: &Token,
        state: &SimulationState,
        rng: &mut R,
    ) -> Vec<Draft> {
        if plans.is_empty() {
            return Vec::new();
        }

        let records = self.request_interactions(plans, token).await.unwrap_or_else(|e| {
            warn!(error = %e, hour = state.current_hour, "interaction batch failed, using templates");
            Vec::new()
        });
        let slots = match_interactions(plans, records);

        let mut filled = 0_usize;
        let drafts: Vec<Draft> = plans
            .iter()
            .zip(slots)
            .map(|(plan, slot)| match slot {
                Some(record) => draft_from_record(record, &plan.persona),
                None => {
                    filled = filled.saturating_add(1);
                    Draft::from(templates::interaction(
                        plan.persona.kind,
                        plan.kind,
                        &token.ticker,
                        &plan.target_author.handle,
                        rng,
                    ))
                }
            })
            .collect();

        log_fill("interactions", state.current_hour, plans.len(), filled);
        drafts
    }
}

/// Pair interaction records with plans.
///
/// A record answers the plan whose request id it echoes, provided its handle
/// (when present) is that plan's persona. A record without an id answers the
/// first unanswered plan of its handle. Everything else is dropped, and the
/// first record for a plan wins.
fn match_interactions(
    plans: &[InteractionPlan],
    records: Vec<ParsedRecord>,
) -> Vec<Option<ParsedRecord>> {
    let mut slots: Vec<Option<ParsedRecord>> = plans.iter().map(|_| None).collect();
    let mut unkeyed = Vec::new();

    for record in records {
        let Some(id) = record.id else {
            unkeyed.push(record);
            continue;
        };
        let Some(plan) = plans.get(id) else {
            continue;
        };
        if record
            .handle
            .as_deref()
            .is_some_and(|h| !same_handle(h, &plan.persona.handle))
        {
            continue;
        }
        if let Some(slot) = slots.get_mut(id)
            && slot.is_none()
        {
            *slot = Some(record);
        }
    }

    for record in unkeyed {
        let Some(handle) = record.handle.as_deref() else {
            continue;
        };
        let open = plans
            .iter()
            .zip(&slots)
            .position(|(plan, slot)| slot.is_none() && same_handle(handle, &plan.persona.handle));
        if let Some(slot) = open.and_then(|i| slots.get_mut(i)) {
            *slot = Some(record);
        }
    }

    slots
}

fn same_handle(claimed: &str, handle: &str) -> bool {
    claimed.trim_start_matches('@').eq_ignore_ascii_case(handle)
}

/// A record with content but no usable sentiment gets the keyword estimate.
fn draft_from_record(record: ParsedRecord, author: &Persona) -> Draft {
    let sentiment = record
        .sentiment
        .unwrap_or_else(|| estimate_sentiment(&record.content, author));
    Draft::new(record.content, sentiment)
}

fn log_fill(batch: &'static str, hour: u32, requested: usize, filled: usize) {
    if filled == 0 {
        debug!(batch, hour, requested, "capability batch complete");
    } else {
        warn!(batch, hour, requested, filled, "template-filled missing capability records");
    }
}
