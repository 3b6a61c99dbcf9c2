//! The external tweet-writing capability.
//!
//! The simulator never talks to a model directly. It hands a rendered batch
//! request to a [`TweetBatchCapability`] and gets raw text back, ideally JSON.
//! Whoever embeds the simulator supplies the implementation; this module
//! only defines the request shapes and a deadline decorator.

use std::future::Future;
use std::time::Duration;

use ctsim_types::{InteractionKind, PersonaType};
use serde::Serialize;
use tokio::time::timeout;

use crate::error::CapabilityError;

/// One persona asked to post this hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaSpec {
    /// Handle the response record must carry.
    pub handle: String,
    /// Archetype.
    pub kind: PersonaType,
    /// Character brief from [`ctsim_types::Persona::system_prompt`].
    pub system_prompt: String,
}

/// A batch of original posts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TweetRequest {
    /// Batch instructions, including the response format.
    pub system_context: String,
    /// One entry per acting persona, in order.
    pub personas: Vec<PersonaSpec>,
    /// Token pitch, market mood and recent timeline.
    pub token_context: String,
    /// Response budget.
    pub max_tokens: u32,
}

/// One planned reply or quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionSpec {
    /// Request id the response record must echo back.
    pub id: usize,
    /// Handle of the persona answering.
    pub handle: String,
    /// Character brief of the persona answering.
    pub system_prompt: String,
    /// Reply or quote.
    pub kind: InteractionKind,
    /// Rendered per-interaction prompt.
    pub prompt: String,
}

/// A batch of replies and quotes, answered by request id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionRequest {
    /// Batch instructions, including the response format.
    pub system_context: String,
    /// One entry per planned interaction, in order.
    pub interactions: Vec<InteractionSpec>,
    /// Response budget.
    pub max_tokens: u32,
}

/// Something that can write tweets for a batch of personas.
///
/// Implementations return the raw response text. Parsing is best-effort
/// on the caller's side, so a capability never has to validate its output.
pub trait TweetBatchCapability {
    /// Write one original post per persona in `request`.
    fn generate_tweets(
        &self,
        request: &TweetRequest,
    ) -> impl Future<Output = Result<String, CapabilityError>>;

    /// Write one reply or quote per entry in `request`.
    fn generate_interactions(
        &self,
        request: &InteractionRequest,
    ) -> impl Future<Output = Result<String, CapabilityError>>;
}

/// Decorator that bounds every call of the wrapped capability.
///
/// Requires a tokio runtime with the timer enabled.
#[derive(Debug, Clone)]
pub struct TimeoutCapability<C> {
    inner: C,
    deadline: Duration,
}

impl<C> TimeoutCapability<C> {
    /// Wrap `inner` so that no call outlives `deadline`.
    pub const fn new(inner: C, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    /// The per-call deadline.
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// The wrapped capability.
    pub const fn inner(&self) -> &C {
        &self.inner
    }

    fn elapsed(&self) -> CapabilityError {
        CapabilityError::Timeout {
            timeout_ms: self.deadline.as_millis(),
        }
    }
}

impl<C: TweetBatchCapability> TweetBatchCapability for TimeoutCapability<C> {
    async fn generate_tweets(&self, request: &TweetRequest) -> Result<String, CapabilityError> {
        match timeout(self.deadline, self.inner.generate_tweets(request)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(self.elapsed()),
        }
    }

    async fn generate_interactions(
        &self,
        request: &InteractionRequest,
    ) -> Result<String, CapabilityError> {
        match timeout(self.deadline, self.inner.generate_interactions(request)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(self.elapsed()),
        }
    }
}
