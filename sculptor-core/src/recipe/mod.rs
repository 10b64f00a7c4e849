pub mod params;


pub use params::{BlockParams, LogicStyle, ParamError};

use crate::catalog;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockRole {
    /// A hardware-modeling primitive that is described in the user turn
    Functional,
    /// The mandatory global environment block; drives the system instruction
    Environment,
    /// Free-text customization appended to the system instruction
    Customization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique instance id, distinct from the catalog base id
    pub id: String,
    pub base_id: String,
    pub role: BlockRole,
    pub label: String,
    pub description: String,
    pub category: String,
    /// Phrase used to describe this block in prompts, e.g. "a flash ADC model"
    pub base_prompt: String,
    #[serde(default)]
    pub params: BlockParams,
}

impl Block {
    pub fn is_mandatory(&self) -> bool {
        self.role == BlockRole::Environment
    }

    /// Sets one parameter from its textual form. The environment threshold
    /// always follows the rails, so `vth` is refused there.
    pub fn set_param(&mut self, key: &str, value: &str) -> Result<(), ParamError> {
        if self.is_mandatory() && key.trim().replace('-', "_") == "vth" {
            return Err(ParamError::Derived("vth".to_string()));
        }
        self.params.set_field(key, value)
    }

    /// Clones this block with a freshly stamped instance id.
    pub fn instantiate(&self) -> Block {
        Block {
            id: format!("{}-{}", self.base_id, Uuid::new_v4()),
            ..self.clone()
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipeError {
    #[error("block '{0}' is not in the recipe")]
    NotFound(String),

    #[error("block '{0}' is mandatory and cannot be removed")]
    Mandatory(String),

    #[error("no catalog block named '{0}'")]
    UnknownTemplate(String),

    #[error("the recipe already has an environment block")]
    DuplicateEnvironment,
}

/// The blocks assembled for one generation request.
///
/// The environment block is held apart from the other blocks so that a recipe
/// always has exactly one of them. Other blocks keep their insertion order,
/// which is the order they are phrased in the user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    blocks: Vec<Block>,
    environment: Block,
}

impl Recipe {
    /// A recipe holding only the catalog's environment block.
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            environment: catalog::environment_template().clone(),
        }
    }

    /// Instantiates `template` and appends it. Returns the stored block.
    pub fn add(&mut self, template: &Block) -> Result<&Block, RecipeError> {
        if template.is_mandatory() {
            return Err(RecipeError::DuplicateEnvironment);
        }

        let block = template.instantiate();
        debug!(id = %block.id, base_id = %block.base_id, "Adding block to recipe");
        self.blocks.push(block);
        Ok(&self.blocks[self.blocks.len() - 1])
    }

    /// Looks `base_id` up in the catalog and adds it.
    pub fn add_from_catalog(&mut self, base_id: &str) -> Result<&Block, RecipeError> {
        let template = catalog::find(base_id)
            .ok_or_else(|| RecipeError::UnknownTemplate(base_id.to_string()))?;
        self.add(template)
    }

    pub fn remove(&mut self, id: &str) -> Result<Block, RecipeError> {
        if self.environment.id == id {
            return Err(RecipeError::Mandatory(id.to_string()));
        }

        let index = self
            .blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| RecipeError::NotFound(id.to_string()))?;

        debug!(id, "Removing block from recipe");
        Ok(self.blocks.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        if self.environment.id == id {
            return Some(&mut self.environment);
        }
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    /// Applies `update` to the parameters of block `id`.
    pub fn update_params<F>(&mut self, id: &str, update: F) -> Result<(), RecipeError>
    where
        F: FnOnce(&mut BlockParams),
    {
        let block = self
            .get_mut(id)
            .ok_or_else(|| RecipeError::NotFound(id.to_string()))?;
        update(&mut block.params);
        Ok(())
    }

    pub fn environment(&self) -> &Block {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Block {
        &mut self.environment
    }

    /// All blocks in order, the environment block last.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().chain(std::iter::once(&self.environment))
    }

    pub fn functional_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|b| b.role == BlockRole::Functional)
    }

    /// Non-empty notes of the customization blocks, in order.
    pub fn customization_notes(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|b| b.role == BlockRole::Customization)
            .filter_map(|b| b.params.note.as_deref())
            .map(str::trim)
            .filter(|note| !note.is_empty())
    }

    pub fn len(&self) -> usize {
        self.blocks.len() + 1
    }

    /// A recipe always holds its environment block, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Drops every added block and re-seeds the environment block from the
    /// catalog.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Recipe {
    fn default() -> Self {
        Self::new()
    }
}
