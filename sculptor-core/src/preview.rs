//! Local preview snippets shown next to each environment setting. These are
//! rendered without any round-trip to the generation backend.

use crate::recipe::params::{Polarity, PowerStyle, Timing, TransitionStyle};
use crate::recipe::{BlockParams, LogicStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippets {
    pub name: String,
    pub hidden: String,
    pub transition: String,
    pub power: String,
    pub reset: String,
    pub enable: String,
}

impl Snippets {
    pub fn from_params(env: &BlockParams) -> Self {
        let name = env.rendered_module_name();
        let header = format!("module {name}(...);");

        let hidden = if env.ignore_hidden_state() {
            format!("(* ignore_hidden_state *)\n{header}")
        } else {
            header.clone()
        };

        let transition = match env.transition_style() {
            TransitionStyle::GlobalMacro => "`define default_transition 10p".to_string(),
            TransitionStyle::ModuleParameter => "parameter real tr = 10p;".to_string(),
        };

        let power = match env.power_style() {
            PowerStyle::DedicatedPorts => "inout electrical vdd, vss;
analog begin
    @(initial_step) begin
        vh  = V(vdd);
        vl  = V(vss);
        vth = (vh + vl) / 2.0;
    end
end"
            .to_string(),
            PowerStyle::ParameterDefined => {
                let (vdd, vss) = env.supply_voltages();
                format!(
                    "parameter real vdd = {vdd};\nparameter real vss = {vss};\nparameter real vth = {};",
                    env.threshold_voltage()
                )
            }
        };

        Self {
            name: header,
            hidden,
            transition,
            power,
            reset: port_logic(env.reset_style(), "reset"),
            enable: port_logic(env.master_enable_style(), "enable"),
        }
    }

    /// (label, snippet) pairs in display order.
    pub fn sections(&self) -> [(&'static str, &str); 6] {
        [
            ("Module Naming", self.name.as_str()),
            ("Header Metadata", self.hidden.as_str()),
            ("Transition Style", self.transition.as_str()),
            ("Power Rails Definition", self.power.as_str()),
            ("Reset Style", self.reset.as_str()),
            ("Master Enable Style", self.enable.as_str()),
        ]
    }
}

fn port_logic(style: LogicStyle, port: &str) -> String {
    let LogicStyle::Active { timing, polarity } = style else {
        return format!("/* No {port} logic */");
    };

    let cond = match polarity {
        Polarity::Low => "< vth",
        Polarity::High => "> vth",
    };

    match timing {
        Timing::Sync => format!(
            "input electrical clk, {port};\n\n@(cross(V(clk) - vth, +1)) begin\n    if (V({port}) {cond}) begin\n        // reset/enable triggered\n    end\nend"
        ),
        Timing::Async => format!(
            "input electrical {port};\n// ASYNC logic\nif (V({port}) {cond}) begin ... end"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::recipe::params::NamingStyle;

    #[test]
    fn test_default_environment_snippets() {
        let snippets = Snippets::from_params(&catalog::environment_template().params);

        assert_eq!(snippets.name, "module analog_block(...);");
        assert_eq!(
            snippets.hidden,
            "(* ignore_hidden_state *)\nmodule analog_block(...);"
        );
        assert_eq!(snippets.transition, "parameter real tr = 10p;");
        assert_eq!(
            snippets.power,
            "parameter real vdd = 1.2;\nparameter real vss = 0;\nparameter real vth = 0.6;"
        );
        assert_eq!(
            snippets.reset,
            "input electrical reset;\n// ASYNC logic\nif (V(reset) < vth) begin ... end"
        );
        assert_eq!(snippets.enable, "/* No enable logic */");
    }

    #[test]
    fn test_sync_logic_uses_clock_edge() {
        let env = BlockParams {
            master_enable_style: Some("sync-active-high".into()),
            ..Default::default()
        };
        let snippets = Snippets::from_params(&env);
        assert!(snippets
            .enable
            .starts_with("input electrical clk, enable;\n\n@(cross(V(clk) - vth, +1)) begin"));
        assert!(snippets.enable.contains("if (V(enable) > vth) begin"));
    }

    #[test]
    fn test_uppercase_and_dedicated_ports() {
        let env = BlockParams {
            module_name: Some("sar_ctrl".to_string()),
            naming_style: Some(NamingStyle::Uppercase),
            power_style: Some(PowerStyle::DedicatedPorts),
            transition_style: Some(TransitionStyle::GlobalMacro),
            ..Default::default()
        };
        let snippets = Snippets::from_params(&env);
        assert_eq!(snippets.name, "module SAR_CTRL(...);");
        assert_eq!(snippets.hidden, "module SAR_CTRL(...);");
        assert_eq!(snippets.transition, "`define default_transition 10p");
        assert!(snippets.power.starts_with("inout electrical vdd, vss;"));
        assert_eq!(snippets.sections().len(), 6);
    }
}
