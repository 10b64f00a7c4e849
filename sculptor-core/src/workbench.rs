//! Controller that owns the editable state and the single live session.
//!
//! Edits only mark the workbench dirty. The session is reconciled right
//! before each generation, so the instruction a request is sent with always
//! reflects every edit made before it started. A generation is split into
//! [`Workbench::begin_generation`], [`PendingGeneration::run`] and
//! [`Workbench::apply`] so the network round-trip can happen without holding
//! the workbench. Every edit bumps an epoch, and `apply` drops a reply whose
//! epoch or session is no longer current.

use crate::extract::GeneratedResult;
use crate::prompt::{build_prompt, SessionInputs};
use crate::recipe::{BlockParams, ParamError, Recipe, RecipeError};
use crate::session::{Session, SessionError, SessionManager};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum WorkbenchError {
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("a generation is already in progress")]
    Busy,

    #[error("add a functional block or reference code before generating")]
    NothingToGenerate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl WorkbenchError {
    /// True when the provider failed in a way that may clear up on its own,
    /// so triggering the same generation again later can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Session(SessionError::Provider(err)) if err.is_transient())
    }
}

impl ChatMessage {
    fn user(text: String) -> Self {
        Self {
            role: ChatRole::User,
            text,
            code: None,
            explanation: None,
            timestamp: Utc::now(),
        }
    }

    fn model(result: &GeneratedResult) -> Self {
        Self {
            role: ChatRole::Model,
            text: result.explanation.clone(),
            code: Some(result.code.clone()),
            explanation: Some(result.explanation.clone()),
            timestamp: Utc::now(),
        }
    }
}

/// What `apply` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// The state was edited, reset or re-synced after the request was sent
    Discarded,
}

/// A generation request detached from the workbench.
pub struct PendingGeneration {
    manager: SessionManager,
    session: Arc<Session>,
    prompt: String,
    epoch: u64,
}

impl PendingGeneration {
    pub fn session_id(&self) -> Uuid {
        self.session.id()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub async fn run(self) -> GenerationOutcome {
        let result = self
            .manager
            .generate(Some(self.session.as_ref()), &self.prompt)
            .await;
        GenerationOutcome {
            session_id: self.session.id(),
            epoch: self.epoch,
            result,
        }
    }
}

#[derive(Debug)]
pub struct GenerationOutcome {
    pub session_id: Uuid,
    /// Workbench epoch at the time the request was built
    pub epoch: u64,
    pub result: Result<GeneratedResult, SessionError>,
}

pub struct Workbench {
    manager: SessionManager,
    recipe: Recipe,
    customization: String,
    reference_code: String,
    session: Option<Arc<Session>>,
    result: Option<GeneratedResult>,
    transcript: Vec<ChatMessage>,
    dirty: bool,
    epoch: u64,
    busy: bool,
}

impl Workbench {
    pub fn new(manager: SessionManager) -> Self {
        Self {
            manager,
            recipe: Recipe::new(),
            customization: String::new(),
            reference_code: String::new(),
            session: None,
            result: None,
            transcript: Vec::new(),
            dirty: true,
            epoch: 0,
            busy: false,
        }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn customization(&self) -> &str {
        &self.customization
    }

    pub fn reference_code(&self) -> &str {
        &self.reference_code
    }

    /// Output of the last successful generation, if any.
    pub fn result(&self) -> Option<&GeneratedResult> {
        self.result.as_ref()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn current_session(&self) -> Option<&Arc<Session>> {
        self.session.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.epoch += 1;
    }

    /// Replaces the whole recipe, e.g. one assembled from command-line input.
    pub fn set_recipe(&mut self, recipe: Recipe) {
        self.recipe = recipe;
        self.touch();
    }

    /// Instantiates a catalog block and returns the new instance id.
    pub fn add_block(&mut self, base_id: &str) -> Result<String, WorkbenchError> {
        let id = self.recipe.add_from_catalog(base_id)?.id.clone();
        debug!(%id, "Added block");
        self.touch();
        Ok(id)
    }

    pub fn remove_block(&mut self, id: &str) -> Result<(), WorkbenchError> {
        self.recipe.remove(id)?;
        debug!(%id, "Removed block");
        self.touch();
        Ok(())
    }

    pub fn update_params<F>(&mut self, id: &str, update: F) -> Result<(), WorkbenchError>
    where
        F: FnOnce(&mut BlockParams),
    {
        self.recipe.update_params(id, update)?;
        self.touch();
        Ok(())
    }

    /// Sets one parameter from its textual form. An empty value clears it.
    pub fn set_param(&mut self, id: &str, key: &str, value: &str) -> Result<(), WorkbenchError> {
        let block = self
            .recipe
            .get_mut(id)
            .ok_or_else(|| RecipeError::NotFound(id.to_string()))?;
        block.set_param(key, value)?;
        self.touch();
        Ok(())
    }

    pub fn set_customization(&mut self, text: impl Into<String>) {
        self.customization = text.into();
        self.touch();
    }

    pub fn set_reference_code(&mut self, text: impl Into<String>) {
        self.reference_code = text.into();
        self.touch();
    }

    /// Returns to the freshly initialized state. The next reconcile opens a
    /// session identical in instruction to a never-touched workbench.
    pub fn reset(&mut self) {
        self.recipe.reset();
        self.customization.clear();
        self.reference_code.clear();
        self.result = None;
        self.transcript.clear();
        self.touch();
        info!("Workbench reset");
    }

    pub fn session_inputs(&self) -> SessionInputs {
        SessionInputs::from_recipe(&self.recipe, &self.customization, &self.reference_code)
    }

    /// The user turn the next generation would send.
    pub fn prompt(&self) -> String {
        build_prompt(&self.recipe, &self.session_inputs())
    }

    /// Returns a session whose instruction reflects the current state,
    /// starting a new one if anything changed since the last call.
    pub fn reconcile(&mut self) -> Arc<Session> {
        if !self.dirty {
            if let Some(session) = &self.session {
                return session.clone();
            }
        }

        let session = Arc::new(self.manager.start_session(&self.session_inputs()));
        if let Some(previous) = self.session.replace(session.clone()) {
            debug!(previous = %previous.id(), current = %session.id(), "Replaced session");
        }
        self.dirty = false;
        session
    }

    pub fn begin_generation(&mut self) -> Result<PendingGeneration, WorkbenchError> {
        if self.busy {
            return Err(WorkbenchError::Busy);
        }

        let inputs = self.session_inputs();
        if !inputs.has_reference() && self.recipe.functional_blocks().next().is_none() {
            return Err(WorkbenchError::NothingToGenerate);
        }

        let session = self.reconcile();
        let prompt = build_prompt(&self.recipe, &inputs);
        self.transcript.push(ChatMessage::user(prompt.clone()));
        self.busy = true;

        Ok(PendingGeneration {
            manager: self.manager.clone(),
            session,
            prompt,
            epoch: self.epoch,
        })
    }

    /// Folds a finished generation back into the workbench. A failure keeps
    /// the previous result and is returned to the caller.
    pub fn apply(&mut self, outcome: GenerationOutcome) -> Result<Applied, WorkbenchError> {
        self.busy = false;

        let current = self.session.as_ref().map(|s| s.id());
        if current != Some(outcome.session_id) || self.epoch != outcome.epoch {
            warn!(
                stale = %outcome.session_id,
                ?current,
                sent_at = outcome.epoch,
                epoch = self.epoch,
                "Discarding reply for outdated state"
            );
            return Ok(Applied::Discarded);
        }

        let result = outcome.result?;
        info!(
            session_id = %outcome.session_id,
            has_code = result.has_code(),
            "Generation applied"
        );
        self.transcript.push(ChatMessage::model(&result));
        self.result = Some(result);
        Ok(Applied::Updated)
    }

    /// Runs one generation to completion.
    pub async fn generate(&mut self) -> Result<GeneratedResult, WorkbenchError> {
        let pending = self.begin_generation()?;
        let outcome = pending.run().await;
        self.apply(outcome)?;
        Ok(self.result.clone().unwrap_or_default())
    }
}
