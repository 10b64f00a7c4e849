use crate::prompt::{PromptComponent, PromptComponentId, SessionInputs};
use crate::recipe::LogicStyle;

pub const ID: PromptComponentId = PromptComponentId("logic");

/// Rendering of the `none` logic style.
pub const NO_LOGIC_MARKER: &str = "None";

pub const CLOCK_DIRECTIVE: &str =
    "MANDATORY: Include a 'clk' port for synchronous operations.";

const SYNC_RULES: &str = "SYNCHRONOUS LOGIC RULES:
If a synchronous style is selected, you MUST use a clock 'clk'.
Example pattern for Sync Reset (Active-Low):
@(cross(V(clk) - vth, +1)) begin
    if (V(rst_n) < vth) begin
        // Reset logic here
    end else if (enable > vth) begin
        // Normal operation
    end
end";

/// `sync-active-low` renders as `SYNC logic with active-low polarity`;
/// `none` renders as the no-logic marker.
pub fn format_logic_style(style: &LogicStyle) -> String {
    match style {
        LogicStyle::None => NO_LOGIC_MARKER.to_string(),
        LogicStyle::Active { timing, polarity } => format!(
            "{} logic with active-{polarity} polarity",
            timing.to_string().to_uppercase()
        ),
    }
}

pub struct LogicComponent;

impl PromptComponent for LogicComponent {
    fn id(&self) -> PromptComponentId {
        ID
    }

    fn build_prompt_section(&self, inputs: &SessionInputs) -> Option<String> {
        let env = &inputs.environment;
        Some(format!(
            "LOGIC PATTERNS:\n- Reset Logic: {}.\n- Master Enable: {}.\n\n{SYNC_RULES}",
            format_logic_style(&env.reset_style()),
            format_logic_style(&env.master_enable_style()),
        ))
    }
}
