use crate::prompt::{PromptComponent, PromptComponentId, SessionInputs};

pub const ROLE_ID: PromptComponentId = PromptComponentId("role");
pub const SKILLS_ID: PromptComponentId = PromptComponentId("skills");
pub const FORMAT_ID: PromptComponentId = PromptComponentId("format");

const ROLE: &str = "You are an Expert Analog Verilog-A Modeler. Generate code following \
high-performance industry standards (reference: Arcadia-1/veriloga-skills).";

const FORMAT: &str = "Format: Return ONLY the code in a markdown block, followed by a brief \
'Sculptor Insight' explanation.";

pub struct RoleComponent;

impl PromptComponent for RoleComponent {
    fn id(&self) -> PromptComponentId {
        ROLE_ID
    }

    fn build_prompt_section(&self, _inputs: &SessionInputs) -> Option<String> {
        Some(ROLE.to_string())
    }
}

/// Fixed analog modeling rules, plus the discipline and noise policy of the
/// environment.
pub struct SkillsComponent;

impl PromptComponent for SkillsComponent {
    fn id(&self) -> PromptComponentId {
        SKILLS_ID
    }

    fn build_prompt_section(&self, inputs: &SessionInputs) -> Option<String> {
        let env = &inputs.environment;
        let mut rules = vec![
            "Include 'disciplines.vams' and 'constants.vams'.".to_string(),
            format!(
                "Use {} disciplines for all physical ports.",
                env.discipline()
            ),
            "Use transition(value, delay, trise, tfall) for all electrical outputs to prevent convergence issues.".to_string(),
            "Implement ADC/DAC ranges strictly with the provided Voltage limits.".to_string(),
            "Implement TDC/DTC ranges strictly with the provided Time limits.".to_string(),
            "Ensure robust behavior at the boundaries of full-scale ranges.".to_string(),
        ];
        if env.include_noise() {
            rules.push(
                "Model thermal and flicker noise with white_noise() and flicker_noise() contributions.".to_string(),
            );
        }

        let numbered: Vec<String> = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| format!("{}. {rule}", i + 1))
            .collect();

        Some(format!("ANALOG MODELING SKILLS:\n{}", numbered.join("\n")))
    }
}

pub struct FormatComponent;

impl PromptComponent for FormatComponent {
    fn id(&self) -> PromptComponentId {
        FORMAT_ID
    }

    fn build_prompt_section(&self, _inputs: &SessionInputs) -> Option<String> {
        Some(FORMAT.to_string())
    }
}
