//! Generation sessions. A [`Session`] is an explicit handle bound to one
//! system instruction; changing any input means starting a new session
//! rather than mutating the old one.


use crate::ai::{AiError, AiProvider, ConversationRequest, Message, ModelSettings};
use crate::extract::{extract_reply, GeneratedResult};
use crate::prompt::{build_system_instruction, SessionInputs};
use std::ops::RangeInclusive;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Sampling temperatures sessions are allowed to use.
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.1..=0.3;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no active session; start one before generating")]
    NoActiveSession,

    #[error("a generation is already in flight on this session")]
    Busy,

    #[error(transparent)]
    Provider(#[from] AiError),
}

pub struct Session {
    id: Uuid,
    system_instruction: String,
    model: ModelSettings,
    provider: Arc<dyn AiProvider>,
    history: Mutex<Vec<Message>>,
}

impl Session {
    fn new(provider: Arc<dyn AiProvider>, model: ModelSettings, system_instruction: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            system_instruction,
            model,
            provider,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn model_settings(&self) -> &ModelSettings {
        &self.model
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Snapshot of the turns exchanged so far.
    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.clone()
    }

    /// Sends one user turn and returns the raw reply text. The history is
    /// only extended when the provider call succeeds.
    pub async fn send(&self, prompt: &str) -> Result<String, SessionError> {
        let mut history = self.history.try_lock().map_err(|_| SessionError::Busy)?;

        let mut messages = history.clone();
        messages.push(Message::user(prompt));

        debug!(session_id = %self.id, turns = messages.len(), "Sending generation turn");
        let response = self
            .provider
            .converse(ConversationRequest {
                messages: messages.clone(),
                model: self.model.clone(),
                system_prompt: self.system_instruction.clone(),
            })
            .await?;

        info!(
            session_id = %self.id,
            usage = ?response.usage,
            stop_reason = ?response.stop_reason,
            "Generation turn completed"
        );

        messages.push(Message::assistant(response.content.clone()));
        *history = messages;
        Ok(response.content)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Opens sessions against one provider with fixed model settings.
#[derive(Clone)]
pub struct SessionManager {
    provider: Arc<dyn AiProvider>,
    model: ModelSettings,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn AiProvider>, mut model: ModelSettings) -> Self {
        model.temperature = Some(clamp_temperature(model.temperature));
        Self { provider, model }
    }

    pub fn model_settings(&self) -> &ModelSettings {
        &self.model
    }

    /// Builds the system instruction for `inputs` and opens a fresh session
    /// scoped by it. Any previously returned session is simply dropped by
    /// the caller.
    pub fn start_session(&self, inputs: &SessionInputs) -> Session {
        let instruction = build_system_instruction(inputs);
        let session = Session::new(self.provider.clone(), self.model.clone(), instruction);
        info!(
            session_id = %session.id,
            provider = self.provider.name(),
            model = self.model.model.name(),
            instruction_len = session.system_instruction.len(),
            "Started generation session"
        );
        session
    }

    /// Sends `prompt` on `session` and splits the reply into code and
    /// explanation.
    pub async fn generate(
        &self,
        session: Option<&Session>,
        prompt: &str,
    ) -> Result<GeneratedResult, SessionError> {
        let session = session.ok_or(SessionError::NoActiveSession)?;
        let reply = session.send(prompt).await?;
        Ok(extract_reply(&reply))
    }
}

fn clamp_temperature(temperature: Option<f32>) -> f32 {
    let lo = *TEMPERATURE_RANGE.start();
    let hi = *TEMPERATURE_RANGE.end();
    match temperature {
        Some(t) if t.is_finite() => t.clamp(lo, hi),
        _ => lo,
    }
}
