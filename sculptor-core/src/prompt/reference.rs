use crate::prompt::{PromptComponent, PromptComponentId, SessionInputs};

pub const REFERENCE_ID: PromptComponentId = PromptComponentId("reference");
pub const CUSTOMIZATION_ID: PromptComponentId = PromptComponentId("customization");

/// Embeds user supplied reference code verbatim. Only contributes when the
/// reference text is non-blank.
pub struct ReferenceComponent;

impl PromptComponent for ReferenceComponent {
    fn id(&self) -> PromptComponentId {
        REFERENCE_ID
    }

    fn build_prompt_section(&self, inputs: &SessionInputs) -> Option<String> {
        if !inputs.has_reference() {
            return None;
        }
        Some(format!(
            "REFERENCE CODE:\nMimic the structure of the following reference:\n{}",
            inputs.reference_code
        ))
    }
}

pub struct CustomizationComponent;

impl PromptComponent for CustomizationComponent {
    fn id(&self) -> PromptComponentId {
        CUSTOMIZATION_ID
    }

    fn build_prompt_section(&self, inputs: &SessionInputs) -> Option<String> {
        let body = if inputs.customization.is_empty() {
            "None provided.".to_string()
        } else {
            inputs.customization.join("\n")
        };
        Some(format!("CUSTOMIZATION:\n{body}"))
    }
}
