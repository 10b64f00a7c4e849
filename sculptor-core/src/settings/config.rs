use crate::ai::mock::MockBehavior;
use crate::ai::model::{Model, DEFAULT_TEMPERATURE};
use crate::ai::types::ModelSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Environment variables consulted, in order, when a Gemini provider has no
/// key in the settings file.
pub const GEMINI_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Core application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// The name of the currently active provider
    #[serde(default)]
    pub active_provider: Option<String>,

    /// Model used for new generation sessions
    #[serde(default)]
    pub model: Model,

    /// Sampling temperature. Sessions clamp this to the low-creativity band.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u32>,

    /// Map of provider name to configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "gemini")]
    Gemini {
        /// Empty means "read from the environment"
        #[serde(default)]
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    #[serde(rename = "openrouter")]
    OpenRouter { api_key: String },
    #[serde(rename = "mock")]
    Mock {
        #[serde(default)]
        behavior: MockBehavior,
    },
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> Option<u32> {
    Some(8192)
}

impl Default for Settings {
    fn default() -> Self {
        let mut providers = HashMap::new();
        providers.insert(
            "gemini".to_string(),
            ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            },
        );

        Self {
            active_provider: Some("gemini".to_string()),
            model: Model::default(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            providers,
        }
    }
}

impl Settings {
    /// Get the active provider configuration
    pub fn active_provider(&self) -> Option<&ProviderConfig> {
        let provider = self.active_provider.as_ref()?;
        self.providers.get(provider)
    }

    /// Set the active provider (returns error if provider doesn't exist)
    pub fn set_active_provider(&mut self, name: &str) -> Result<(), String> {
        if self.providers.contains_key(name) {
            self.active_provider = Some(name.to_string());
            Ok(())
        } else {
            Err(format!("Provider '{name}' not found"))
        }
    }

    /// Add or update a provider configuration
    pub fn add_provider(&mut self, name: String, config: ProviderConfig) {
        self.providers.insert(name, config);
    }

    /// Remove a provider configuration
    pub fn remove_provider(&mut self, name: &str) -> Result<(), String> {
        if Some(name) == self.active_provider.as_deref() {
            return Err("Cannot remove the active provider".to_string());
        }

        if self.providers.remove(name).is_some() {
            Ok(())
        } else {
            Err(format!("Provider '{name}' not found"))
        }
    }

    /// List all provider names, sorted
    pub fn list_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            model: self.model,
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        }
    }
}

impl ProviderConfig {
    /// Get the API key for OpenRouter provider
    pub fn openrouter_api_key(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenRouter { api_key } => Some(api_key.as_str()),
            ProviderConfig::Gemini { .. } => None,
            ProviderConfig::Mock { .. } => None,
        }
    }

    /// Resolve the Gemini API key from settings or the process environment.
    pub fn gemini_api_key(&self) -> Option<String> {
        self.gemini_api_key_with(|var| std::env::var(var).ok())
    }

    pub(crate) fn gemini_api_key_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ProviderConfig::Gemini { api_key, .. } = self else {
            return None;
        };

        if !api_key.trim().is_empty() {
            return Some(api_key.trim().to_string());
        }

        GEMINI_KEY_VARS
            .iter()
            .filter_map(|var| lookup(var))
            .find(|value| !value.trim().is_empty())
    }
}
