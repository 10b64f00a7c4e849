use crate::ai::types::ModelSettings;
use serde::{Deserialize, Serialize};

/// Temperature sessions are opened with unless settings say otherwise.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// The supported models. The first entry is the default.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::VariantArray,
)]
pub enum Model {
    #[default]
    Gemini3ProPreview,
    Gemini25Pro,
    Gemini25Flash,

    ClaudeSonnet45,
    Gpt5,
    Qwen3Coder,

    /// This allows code to match all models, but still match _ => to
    /// avoid being *required* to match all models.
    None,
}

impl Model {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gemini3ProPreview => "gemini-3-pro-preview",
            Self::Gemini25Pro => "gemini-2.5-pro",
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::ClaudeSonnet45 => "claude-sonnet-45",
            Self::Gpt5 => "gpt-5",
            Self::Qwen3Coder => "qwen3-coder",
            Self::None => "None",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "gemini-3-pro-preview" => Some(Self::Gemini3ProPreview),
            "gemini-2.5-pro" => Some(Self::Gemini25Pro),
            "gemini-2.5-flash" => Some(Self::Gemini25Flash),
            "claude-sonnet-45" => Some(Self::ClaudeSonnet45),
            "gpt-5" => Some(Self::Gpt5),
            "qwen3-coder" => Some(Self::Qwen3Coder),
            _ => None,
        }
    }

    /// Every real model, in declaration order.
    pub fn selectable() -> impl Iterator<Item = Model> {
        use strum::VariantArray;
        Self::VARIANTS.iter().copied().filter(|m| *m != Model::None)
    }

    pub const fn is_gemini(self) -> bool {
        matches!(
            self,
            Self::Gemini3ProPreview | Self::Gemini25Pro | Self::Gemini25Flash
        )
    }

    // Return default model settings for the model
    pub fn default_settings(self) -> ModelSettings {
        ModelSettings {
            model: self,
            max_tokens: Some(8192),
            temperature: Some(DEFAULT_TEMPERATURE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::VariantArray;

    #[test]
    fn test_names_round_trip() {
        for model in Model::VARIANTS {
            if *model == Model::None {
                assert_eq!(Model::from_name(model.name()), None);
                continue;
            }
            assert_eq!(Model::from_name(model.name()), Some(*model));
        }
    }

    #[test]
    fn test_default_settings_are_low_temperature() {
        let settings = Model::default().default_settings();
        assert_eq!(settings.model, Model::Gemini3ProPreview);
        assert_eq!(settings.temperature, Some(0.1));
    }
}
