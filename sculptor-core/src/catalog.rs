//! The library of block templates a recipe is assembled from.

use std::sync::OnceLock;

use crate::recipe::params::{
    ConverterType, Discipline, Encoding, LogicStyle, NamingStyle, Polarity, PowerStyle, Timing,
    TransitionStyle, DEFAULT_MODULE_NAME, DEFAULT_VDD, DEFAULT_VSS,
};
use crate::recipe::{Block, BlockParams, BlockRole};

pub const ENVIRONMENT_ID: &str = "env_global";
pub const CUSTOM_NOTE_ID: &str = "custom_note";

/// All templates in display order.
pub fn catalog() -> &'static [Block] {
    static CATALOG: OnceLock<Vec<Block>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

pub fn find(base_id: &str) -> Option<&'static Block> {
    catalog().iter().find(|b| b.base_id == base_id)
}

/// The mandatory environment template every recipe is seeded with.
pub fn environment_template() -> &'static Block {
    static ENVIRONMENT: OnceLock<Block> = OnceLock::new();
    ENVIRONMENT.get_or_init(|| {
        template(
            ENVIRONMENT_ID,
            "Environment",
            BlockRole::Environment,
            "Global Environment",
            "Naming, rails and control logic",
            "",
            BlockParams {
                module_name: Some(DEFAULT_MODULE_NAME.to_string()),
                naming_style: Some(NamingStyle::Lowercase),
                ignore_hidden_state: Some(true),
                transition_style: Some(TransitionStyle::ModuleParameter),
                power_style: Some(PowerStyle::ParameterDefined),
                vdd: Some(DEFAULT_VDD),
                vss: Some(DEFAULT_VSS),
                reset_style: Some(LogicStyle::new(Timing::Async, Polarity::Low)),
                master_enable_style: Some(LogicStyle::None),
                include_noise: Some(false),
                discipline: Some(Discipline::Electrical),
                ..Default::default()
            },
        )
    })
}

/// Templates grouped by category, preserving catalog order. The environment
/// template is not part of any group since it cannot be added.
pub fn by_category() -> Vec<(&'static str, Vec<&'static Block>)> {
    let mut groups: Vec<(&'static str, Vec<&'static Block>)> = Vec::new();
    for block in catalog() {
        match groups.iter_mut().find(|(c, _)| *c == block.category) {
            Some((_, blocks)) => blocks.push(block),
            None => groups.push((block.category.as_str(), vec![block])),
        }
    }
    groups
}

fn template(
    base_id: &str,
    category: &str,
    role: BlockRole,
    label: &str,
    description: &str,
    base_prompt: &str,
    params: BlockParams,
) -> Block {
    Block {
        id: base_id.to_string(),
        base_id: base_id.to_string(),
        role,
        label: label.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        base_prompt: base_prompt.to_string(),
        params,
    }
}

fn functional(
    base_id: &str,
    category: &str,
    label: &str,
    description: &str,
    base_prompt: &str,
    params: BlockParams,
) -> Block {
    template(
        base_id,
        category,
        BlockRole::Functional,
        label,
        description,
        base_prompt,
        params,
    )
}

fn build_catalog() -> Vec<Block> {
    let p = BlockParams::default;
    vec![
        // Data converters
        functional(
            "dac_bin",
            "Converters",
            "Binary DAC",
            "N-bit binary weighted",
            "a binary-weighted DAC",
            BlockParams {
                bits: Some(8),
                vstep: Some(1.0),
                tr: Some("10n".to_string()),
                lower_limit: Some("0".to_string()),
                upper_limit: Some("1.0".to_string()),
                converter_type: Some(ConverterType::Static),
                encoding: Some(Encoding::Binary),
                ..p()
            },
        ),
        functional(
            "dac_thm",
            "Converters",
            "Therm DAC",
            "N-bit thermometer",
            "a thermometer-coded DAC",
            BlockParams {
                bits: Some(16),
                vstep: Some(1.0),
                tr: Some("10n".to_string()),
                encoding: Some(Encoding::Thermometer),
                ..p()
            },
        ),
        functional(
            "adc_flash",
            "Converters",
            "Flash ADC",
            "N-bit flash ADC",
            "a flash ADC model",
            BlockParams {
                bits: Some(4),
                vth: Some(0.5),
                ..p()
            },
        ),
        functional(
            "adc_sar",
            "Converters",
            "SAR Logic",
            "Successive approx logic",
            "SAR ADC control logic",
            BlockParams {
                bits: Some(10),
                converter_type: Some(ConverterType::Clocked),
                ..p()
            },
        ),
        // Logic and digital
        functional(
            "logic_dec",
            "Logic",
            "Decoder",
            "Binary-to-OneHot",
            "a binary-to-onehot decoder",
            BlockParams {
                bits: Some(4),
                polarity: Some(Polarity::High),
                ..p()
            },
        ),
        functional(
            "logic_ptr",
            "Logic",
            "Pointer Gen",
            "Rotating pointer",
            "a rotating pointer generator",
            BlockParams {
                bits: Some(8),
                polarity: Some(Polarity::Low),
                ..p()
            },
        ),
        functional(
            "logic_mux",
            "Logic",
            "Analog MUX",
            "N-channel multiplexer",
            "an analog multiplexer",
            BlockParams {
                bits: Some(4),
                ..p()
            },
        ),
        functional(
            "logic_lshift",
            "Logic",
            "Lvl Shifter",
            "Domain shifter",
            "a level shifter",
            BlockParams {
                polarity: Some(Polarity::High),
                ..p()
            },
        ),
        functional(
            "logic_div",
            "Logic",
            "Freq Div",
            "Integer divider",
            "a frequency divider",
            BlockParams {
                bits: Some(4),
                ..p()
            },
        ),
        // Analog mixed-signal
        functional(
            "comp",
            "Mixed-Signal",
            "Comparator",
            "High-speed comp",
            "a voltage comparator",
            BlockParams {
                vth: Some(0.5),
                tr: Some("1n".to_string()),
                ..p()
            },
        ),
        functional(
            "opamp",
            "Mixed-Signal",
            "Ideal OpAmp",
            "VCVS based amp",
            "an ideal operational amplifier",
            BlockParams {
                gain: Some(100000.0),
                tr: Some("100n".to_string()),
                ..p()
            },
        ),
        functional(
            "cpump",
            "Mixed-Signal",
            "Charge Pump",
            "PLL charge pump",
            "a PLL charge pump with UP/DN inputs",
            BlockParams {
                polarity: Some(Polarity::High),
                ..p()
            },
        ),
        functional(
            "pdet",
            "Mixed-Signal",
            "Phase Det",
            "PFD for PLL",
            "a phase frequency detector",
            BlockParams {
                polarity: Some(Polarity::High),
                ..p()
            },
        ),
        // Control and infrastructure
        functional(
            "feat_rst",
            "Control",
            "Async Reset",
            "Reset control",
            "asynchronous reset logic",
            BlockParams {
                polarity: Some(Polarity::Low),
                ..p()
            },
        ),
        functional(
            "feat_en",
            "Control",
            "Enable",
            "Enable/Disable pin",
            "a master enable pin",
            BlockParams {
                polarity: Some(Polarity::High),
                ..p()
            },
        ),
        functional(
            "feat_clk",
            "Control",
            "Clock Sync",
            "Edge-trigger",
            "clock-synchronous updates",
            BlockParams {
                vth: Some(0.5),
                ..p()
            },
        ),
        // Physical and reference
        functional(
            "phys_pwr",
            "Physical",
            "Power Pins",
            "VDD/VSS ports",
            "dedicated VDD and VSS power ports",
            p(),
        ),
        functional(
            "phys_noise",
            "Physical",
            "Noise Gen",
            "Thermal/Flicker",
            "thermal and flicker noise sources",
            p(),
        ),
        functional(
            "phys_res",
            "Physical",
            "Trim Res",
            "Binary weighted R",
            "a trimmable resistor network",
            BlockParams {
                bits: Some(8),
                ..p()
            },
        ),
        functional(
            "phys_cap",
            "Physical",
            "Varactor",
            "Voltage-variable C",
            "a behavioral varactor model",
            BlockParams {
                gain: Some(1.0),
                ..p()
            },
        ),
        template(
            CUSTOM_NOTE_ID,
            "Customization",
            BlockRole::Customization,
            "Custom Note",
            "Free-text instruction",
            "",
            BlockParams {
                note: Some(String::new()),
                ..p()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_base_ids_are_unique() {
        let ids: HashSet<&str> = catalog().iter().map(|b| b.base_id.as_str()).collect();
        assert_eq!(ids.len(), catalog().len());
        assert!(!ids.contains(ENVIRONMENT_ID));
    }

    #[test]
    fn test_environment_template_is_mandatory() {
        let env = environment_template();
        assert!(env.is_mandatory());
        assert_eq!(env.id, ENVIRONMENT_ID);
        assert_eq!(env.params.threshold_voltage(), 0.6);
    }

    #[test]
    fn test_find() {
        let block = find("adc_flash").unwrap();
        assert_eq!(block.params.bits, Some(4));
        assert_eq!(block.params.vth, Some(0.5));
        assert!(find("does_not_exist").is_none());
    }

    #[test]
    fn test_by_category_keeps_order() {
        let groups = by_category();
        let names: Vec<&str> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            names,
            vec![
                "Converters",
                "Logic",
                "Mixed-Signal",
                "Control",
                "Physical",
                "Customization"
            ]
        );
        assert_eq!(groups[0].1.len(), 4);
    }
}
