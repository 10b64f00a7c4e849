use crate::prompt::SessionInputs;
use crate::recipe::params::{ComparatorEnable, ConverterType};
use crate::recipe::{Block, Recipe};

/// Builds the user turn for one generation request.
///
/// Non-blank reference code replaces the block-by-block description; the
/// environment still shapes the system instruction in both cases.
pub fn build_prompt(recipe: &Recipe, inputs: &SessionInputs) -> String {
    let mut prompt = if inputs.has_reference() {
        "Generate a Verilog-A model that mimics the structure of the reference code in your \
         instructions, applying the global architecture."
            .to_string()
    } else {
        let descriptions: Vec<String> = recipe.functional_blocks().map(describe_block).collect();
        if descriptions.is_empty() {
            "Generate a minimal Verilog-A module skeleton that follows the global architecture."
                .to_string()
        } else {
            format!(
                "Generate a Verilog-A model of {}.",
                descriptions.join("; ")
            )
        }
    };

    let has_name = inputs
        .environment
        .module_name
        .as_deref()
        .is_some_and(|n| !n.trim().is_empty());
    if has_name {
        prompt.push_str(&format!(
            " Name the module {}.",
            inputs.environment.rendered_module_name()
        ));
    }

    prompt
}

/// Base phrase followed by one clause per present parameter. Clause order is
/// fixed: bits, polarity, vstep, vth, tr, gain, freq, then range, converter,
/// encoding and comparator enable.
pub fn describe_block(block: &Block) -> String {
    let p = &block.params;
    let base = if block.base_prompt.trim().is_empty() {
        block.label.as_str()
    } else {
        block.base_prompt.as_str()
    };

    let mut parts = vec![base.to_string()];
    if let Some(bits) = p.bits {
        parts.push(format!("with {bits} bits"));
    }
    if let Some(polarity) = p.polarity {
        parts.push(format!("({polarity}-active)"));
    }
    if let Some(vstep) = p.vstep {
        parts.push(format!("at {vstep} V step"));
    }
    if let Some(vth) = p.vth {
        parts.push(format!("with {vth} V threshold"));
    }
    if let Some(tr) = &p.tr {
        parts.push(format!("with transition time {tr}"));
    }
    if let Some(gain) = p.gain {
        parts.push(format!("with gain factor {gain}"));
    }
    if let Some(freq) = &p.freq {
        parts.push(format!("centered at {freq}"));
    }
    if let (Some(lower), Some(upper)) = (&p.lower_limit, &p.upper_limit) {
        parts.push(format!("spanning {lower} to {upper}"));
    }
    if let Some(converter) = p.converter_type {
        parts.push(
            match converter {
                ConverterType::Static => "as a static converter",
                ConverterType::Clocked => "as a clock-driven converter",
            }
            .to_string(),
        );
    }
    if let Some(encoding) = p.encoding {
        parts.push(format!("using {encoding} encoding"));
    }
    if let Some(enable) = p.comparator_enable {
        parts.push(
            match enable {
                ComparatorEnable::Always => "with an always-on comparator",
                ComparatorEnable::Gated => "with an enable-gated comparator",
            }
            .to_string(),
        );
    }

    parts.join(" ")
}
