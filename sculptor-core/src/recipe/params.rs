use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_MODULE_NAME: &str = "analog_block";
pub const DEFAULT_VDD: f64 = 1.2;
pub const DEFAULT_VSS: f64 = 0.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("unknown parameter '{0}'")]
    UnknownField(String),

    #[error("invalid value '{value}' for parameter '{field}'")]
    InvalidValue { field: String, value: String },

    #[error("parameter '{0}' is derived from the supply rails and cannot be set")]
    Derived(String),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Polarity {
    High,
    Low,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConverterType {
    Static,
    Clocked,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Encoding {
    Binary,
    Gray,
    Thermometer,
    OneHot,
}

/// Whether a comparator evaluates continuously or only while its enable pin
/// is asserted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComparatorEnable {
    Always,
    Gated,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NamingStyle {
    #[default]
    Lowercase,
    Uppercase,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TransitionStyle {
    GlobalMacro,
    #[default]
    ModuleParameter,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PowerStyle {
    DedicatedPorts,
    #[default]
    ParameterDefined,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Discipline {
    #[default]
    Electrical,
    Thermal,
    Mechanical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Timing {
    Sync,
    Async,
}

/// Reset / master-enable logic style.
///
/// The text form is `<timing>-active-<polarity>` (for example
/// `sync-active-low`) or `none`. Parsing never fails: anything that is not one
/// of the five known identifiers is treated as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogicStyle {
    #[default]
    None,
    Active { timing: Timing, polarity: Polarity },
}

impl LogicStyle {
    pub const fn new(timing: Timing, polarity: Polarity) -> Self {
        Self::Active { timing, polarity }
    }

    pub fn is_sync(self) -> bool {
        matches!(
            self,
            Self::Active {
                timing: Timing::Sync,
                ..
            }
        )
    }

    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text == "none" {
            return Self::None;
        }

        let mut parts = text.split('-');
        let timing = match parts.next() {
            Some("sync") => Some(Timing::Sync),
            Some("async") => Some(Timing::Async),
            _ => None,
        };
        let active = parts.next() == Some("active");
        let polarity = parts.next().and_then(|p| Polarity::from_str(p).ok());

        match (timing, active, polarity, parts.next()) {
            (Some(timing), true, Some(polarity), None) => Self::Active { timing, polarity },
            _ => {
                warn!(style = text, "Unrecognized logic style, treating as none");
                Self::None
            }
        }
    }
}

impl fmt::Display for LogicStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicStyle::None => write!(f, "none"),
            LogicStyle::Active { timing, polarity } => write!(f, "{timing}-active-{polarity}"),
        }
    }
}

impl FromStr for LogicStyle {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for LogicStyle {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for LogicStyle {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<LogicStyle> for String {
    fn from(value: LogicStyle) -> Self {
        value.to_string()
    }
}

/// Open record of block parameters. Every field is optional; absent fields
/// simply do not contribute to prompts or previews.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Polarity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vstep: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converter_type: Option<ConverterType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparator_enable: Option<ComparatorEnable>,
    /// Free text carried by customization blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    // Environment settings, only meaningful on the environment block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub naming_style: Option<NamingStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_hidden_state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_style: Option<TransitionStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_style: Option<PowerStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vdd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_style: Option<LogicStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_enable_style: Option<LogicStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_noise: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discipline: Option<Discipline>,
}

impl BlockParams {
    pub fn naming_style(&self) -> NamingStyle {
        self.naming_style.unwrap_or_default()
    }

    pub fn transition_style(&self) -> TransitionStyle {
        self.transition_style.unwrap_or_default()
    }

    pub fn power_style(&self) -> PowerStyle {
        self.power_style.unwrap_or_default()
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline.unwrap_or_default()
    }

    pub fn reset_style(&self) -> LogicStyle {
        self.reset_style.unwrap_or_default()
    }

    pub fn master_enable_style(&self) -> LogicStyle {
        self.master_enable_style.unwrap_or_default()
    }

    pub fn ignore_hidden_state(&self) -> bool {
        self.ignore_hidden_state.unwrap_or(false)
    }

    pub fn include_noise(&self) -> bool {
        self.include_noise.unwrap_or(false)
    }

    pub fn supply_voltages(&self) -> (f64, f64) {
        (
            self.vdd.unwrap_or(DEFAULT_VDD),
            self.vss.unwrap_or(DEFAULT_VSS),
        )
    }

    /// Threshold derived from the supply rails. Always computed, never stored.
    pub fn threshold_voltage(&self) -> f64 {
        let (vdd, vss) = self.supply_voltages();
        (vdd + vss) / 2.0
    }

    /// True when either the reset or the master-enable style is synchronous.
    pub fn clock_required(&self) -> bool {
        self.reset_style().is_sync() || self.master_enable_style().is_sync()
    }

    /// Module name as it should appear in generated code: the configured name
    /// (or `analog_block`), upper-cased under the uppercase naming style.
    pub fn rendered_module_name(&self) -> String {
        let name = self
            .module_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_MODULE_NAME);

        match self.naming_style() {
            NamingStyle::Uppercase => name.to_uppercase(),
            NamingStyle::Lowercase => name.to_string(),
        }
    }

    /// Sets a field from its textual form, the way a form control would. An
    /// empty value clears the field. Dashes in the key are accepted in place
    /// of underscores.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), ParamError> {
        let key = key.trim().replace('-', "_");
        let clear = value.trim().is_empty();

        macro_rules! assign {
            ($target:expr) => {
                $target = if clear {
                    None
                } else {
                    Some(parse_value(&key, value)?)
                }
            };
        }

        match key.as_str() {
            "bits" => assign!(self.bits),
            "polarity" => assign!(self.polarity),
            "vstep" => assign!(self.vstep),
            "vth" => assign!(self.vth),
            "tr" => assign!(self.tr),
            "gain" => assign!(self.gain),
            "freq" => assign!(self.freq),
            "lower_limit" => assign!(self.lower_limit),
            "upper_limit" => assign!(self.upper_limit),
            "converter_type" => assign!(self.converter_type),
            "encoding" => assign!(self.encoding),
            "comparator_enable" => assign!(self.comparator_enable),
            "note" => assign!(self.note),
            "module_name" => assign!(self.module_name),
            "naming_style" => assign!(self.naming_style),
            "ignore_hidden_state" => assign!(self.ignore_hidden_state),
            "transition_style" => assign!(self.transition_style),
            "power_style" => assign!(self.power_style),
            "vdd" => assign!(self.vdd),
            "vss" => assign!(self.vss),
            "reset_style" => assign!(self.reset_style),
            "master_enable_style" => assign!(self.master_enable_style),
            "include_noise" => assign!(self.include_noise),
            "discipline" => assign!(self.discipline),
            _ => return Err(ParamError::UnknownField(key)),
        }

        Ok(())
    }
}

fn parse_value<T: FromStr>(field: &str, value: &str) -> Result<T, ParamError> {
    value.trim().parse().map_err(|_| ParamError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sync-active-low", LogicStyle::new(Timing::Sync, Polarity::Low))]
    #[case("sync-active-high", LogicStyle::new(Timing::Sync, Polarity::High))]
    #[case("async-active-low", LogicStyle::new(Timing::Async, Polarity::Low))]
    #[case("async-active-high", LogicStyle::new(Timing::Async, Polarity::High))]
    #[case("none", LogicStyle::None)]
    #[case("", LogicStyle::None)]
    #[case("sometimes-active-low", LogicStyle::None)]
    #[case("sync-active-low-extra", LogicStyle::None)]
    #[case("sync", LogicStyle::None)]
    fn test_logic_style_parse_is_total(#[case] text: &str, #[case] expected: LogicStyle) {
        assert_eq!(LogicStyle::parse(text), expected);
    }

    #[test]
    fn test_logic_style_text_form_survives_serde() {
        let style = LogicStyle::new(Timing::Async, Polarity::High);
        let json = serde_json::to_string(&style).unwrap();
        assert_eq!(json, "\"async-active-high\"");
        assert_eq!(serde_json::from_str::<LogicStyle>(&json).unwrap(), style);
        assert_eq!(
            serde_json::from_str::<LogicStyle>("\"bogus\"").unwrap(),
            LogicStyle::None
        );
    }

    #[test]
    fn test_threshold_is_mean_of_rails() {
        let params = BlockParams {
            vdd: Some(1.2),
            vss: Some(0.0),
            ..Default::default()
        };
        assert_eq!(params.threshold_voltage(), 0.6);

        let params = BlockParams {
            vdd: Some(2.5),
            vss: Some(-2.5),
            ..Default::default()
        };
        assert_eq!(params.threshold_voltage(), 0.0);
    }

    #[test]
    fn test_threshold_tracks_rail_edits() {
        let mut params = BlockParams::default();
        params.set_field("vdd", "3.3").unwrap();
        params.set_field("vss", "0").unwrap();
        assert_eq!(params.threshold_voltage(), 1.65);
    }

    #[rstest]
    #[case("sync-active-high", "async-active-low", true)]
    #[case("async-active-high", "sync-active-low", true)]
    #[case("async-active-high", "async-active-low", false)]
    #[case("none", "none", false)]
    fn test_clock_required(#[case] reset: &str, #[case] enable: &str, #[case] expected: bool) {
        let params = BlockParams {
            reset_style: Some(reset.into()),
            master_enable_style: Some(enable.into()),
            ..Default::default()
        };
        assert_eq!(params.clock_required(), expected);
    }

    #[test]
    fn test_clock_not_required_when_styles_missing() {
        assert!(!BlockParams::default().clock_required());
    }

    #[test]
    fn test_rendered_module_name() {
        let mut params = BlockParams::default();
        assert_eq!(params.rendered_module_name(), "analog_block");

        params.module_name = Some("dac8".to_string());
        params.naming_style = Some(NamingStyle::Uppercase);
        assert_eq!(params.rendered_module_name(), "DAC8");

        params.module_name = Some("   ".to_string());
        assert_eq!(params.rendered_module_name(), "ANALOG_BLOCK");
    }

    #[test]
    fn test_set_field_parses_and_clears() {
        let mut params = BlockParams::default();
        params.set_field("bits", "12").unwrap();
        params.set_field("encoding", "one-hot").unwrap();
        params.set_field("power-style", "dedicated-ports").unwrap();
        params.set_field("reset_style", "sync-active-low").unwrap();

        assert_eq!(params.bits, Some(12));
        assert_eq!(params.encoding, Some(Encoding::OneHot));
        assert_eq!(params.power_style, Some(PowerStyle::DedicatedPorts));
        assert!(params.reset_style().is_sync());

        params.set_field("bits", "").unwrap();
        assert_eq!(params.bits, None);
    }

    #[test]
    fn test_set_field_errors() {
        let mut params = BlockParams::default();
        assert_eq!(
            params.set_field("bits", "many"),
            Err(ParamError::InvalidValue {
                field: "bits".to_string(),
                value: "many".to_string()
            })
        );
        assert_eq!(
            params.set_field("color", "red"),
            Err(ParamError::UnknownField("color".to_string()))
        );
    }
}
