use crate::prompt::logic::CLOCK_DIRECTIVE;
use crate::prompt::{PromptComponent, PromptComponentId, SessionInputs};
use crate::recipe::params::{NamingStyle, PowerStyle, TransitionStyle};
use crate::recipe::BlockParams;

pub const ID: PromptComponentId = PromptComponentId("architecture");

/// Global architecture policy: naming, header, transitions and power rails.
/// Every policy has mutually exclusive renderings picked by one field.
pub struct ArchitectureComponent;

impl PromptComponent for ArchitectureComponent {
    fn id(&self) -> PromptComponentId {
        ID
    }

    fn build_prompt_section(&self, inputs: &SessionInputs) -> Option<String> {
        let env = &inputs.environment;
        let mut lines = vec![
            "GLOBAL ARCHITECTURE:".to_string(),
            format!("- Naming Style: {}", naming_rule(env.naming_style())),
            format!("- Header: {}", header_rule(env.ignore_hidden_state())),
            format!(
                "- Transition Style: {}",
                transition_rule(env.transition_style())
            ),
            format!("- Power Management: {}", power_rule(env)),
        ];
        if env.clock_required() {
            lines.push(format!("- {CLOCK_DIRECTIVE}"));
        }
        Some(lines.join("\n"))
    }
}

pub fn naming_rule(style: NamingStyle) -> &'static str {
    match style {
        NamingStyle::Uppercase => "Module name and ALL ports MUST be UPPERCASE.",
        NamingStyle::Lowercase => "Module name and ports should be lowercase.",
    }
}

pub fn header_rule(ignore_hidden_state: bool) -> &'static str {
    if ignore_hidden_state {
        "Include (* ignore_hidden_state *) attribute on a separate line above the module."
    } else {
        "Standard module header."
    }
}

pub fn transition_rule(style: TransitionStyle) -> &'static str {
    match style {
        TransitionStyle::GlobalMacro => {
            "Define `define default_transition 10p` at the top. Use it for all transition() calls."
        }
        TransitionStyle::ModuleParameter => {
            "Use a module parameter 'tr' for transition rise/fall times."
        }
    }
}

pub fn power_rule(env: &BlockParams) -> String {
    match env.power_style() {
        PowerStyle::DedicatedPorts => {
            "Use dedicated supply ports: 'inout electrical vdd, vss;'.".to_string()
        }
        PowerStyle::ParameterDefined => {
            let (vdd, vss) = env.supply_voltages();
            format!(
                "Use module parameters for supply voltages:\nparameter real vdd = {vdd};\nparameter real vss = {vss};\nparameter real vth = {};",
                env.threshold_voltage()
            )
        }
    }
}
