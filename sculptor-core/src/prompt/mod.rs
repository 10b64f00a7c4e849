pub mod architecture;
pub mod conventions;
pub mod logic;
pub mod reference;
pub mod turn;


pub use logic::format_logic_style;
pub use turn::{build_prompt, describe_block};

use crate::recipe::{BlockParams, Recipe};
use std::sync::Arc;

/// Strongly-typed identifier for prompt components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PromptComponentId(pub &'static str);

/// A composable unit that contributes one section to the system instruction.
pub trait PromptComponent: Send + Sync {
    fn id(&self) -> PromptComponentId;

    /// Returns the section content, or None if this component should not
    /// contribute for the given inputs.
    fn build_prompt_section(&self, inputs: &SessionInputs) -> Option<String>;
}

/// Everything the system instruction is derived from. Two equal snapshots
/// always produce byte-identical instructions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionInputs {
    /// Parameters of the recipe's environment block
    pub environment: BlockParams,
    /// Free-text customization followed by customization block notes
    pub customization: Vec<String>,
    pub reference_code: String,
}

impl SessionInputs {
    pub fn from_recipe(recipe: &Recipe, customization: &str, reference_code: &str) -> Self {
        let mut notes = Vec::new();
        if !customization.trim().is_empty() {
            notes.push(customization.trim().to_string());
        }
        notes.extend(recipe.customization_notes().map(str::to_string));

        Self {
            environment: recipe.environment().params.clone(),
            customization: notes,
            reference_code: reference_code.to_string(),
        }
    }

    /// Whether the reference-code branch is active. Whitespace-only reference
    /// text counts as absent.
    pub fn has_reference(&self) -> bool {
        !self.reference_code.trim().is_empty()
    }
}

/// Builds the combined system instruction from its components, in order.
#[derive(Clone)]
pub struct PromptBuilder {
    components: Vec<Arc<dyn PromptComponent>>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// The full set of sections used for generation sessions.
    pub fn standard() -> Self {
        let mut builder = Self::new();
        builder.add(Arc::new(conventions::RoleComponent));
        builder.add(Arc::new(architecture::ArchitectureComponent));
        builder.add(Arc::new(logic::LogicComponent));
        builder.add(Arc::new(conventions::SkillsComponent));
        builder.add(Arc::new(reference::ReferenceComponent));
        builder.add(Arc::new(reference::CustomizationComponent));
        builder.add(Arc::new(conventions::FormatComponent));
        builder
    }

    pub fn add(&mut self, component: Arc<dyn PromptComponent>) {
        self.components.push(component);
    }

    pub fn component_ids(&self) -> Vec<PromptComponentId> {
        self.components.iter().map(|c| c.id()).collect()
    }

    /// Joins all contributed sections with blank lines. Returns an empty
    /// string if no component produces content.
    pub fn build(&self, inputs: &SessionInputs) -> String {
        self.components
            .iter()
            .filter_map(|c| c.build_prompt_section(inputs))
            .collect::<Vec<String>>()
            .join("\n\n")
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The persistent instruction a generation session is opened with.
pub fn build_system_instruction(inputs: &SessionInputs) -> String {
    PromptBuilder::standard().build(inputs)
}
