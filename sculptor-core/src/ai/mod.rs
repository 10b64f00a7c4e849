pub mod error;
pub mod gemini;
pub mod mock;
pub mod model;
pub mod openrouter;
pub mod provider;
pub mod types;

#[cfg(test)]
pub mod tests;

pub use error::AiError;
pub use gemini::GeminiProvider;
pub use mock::{MockBehavior, MockProvider};
pub use model::Model;
pub use openrouter::OpenRouterProvider;
pub use provider::AiProvider;
pub use types::*;

use crate::settings::{ProviderConfig, Settings};
use anyhow::{bail, Result};
use std::sync::Arc;

/// Builds the provider registered under `provider` in the settings. Fails
/// when that backend cannot serve the configured model.
pub fn create_provider(settings: &Settings, provider: &str) -> Result<Arc<dyn AiProvider>> {
    let Some(provider_config) = settings.providers.get(provider) else {
        bail!("Provider '{provider}' is not configured in settings")
    };

    let backend: Arc<dyn AiProvider> = match provider_config {
        ProviderConfig::Gemini { base_url, .. } => {
            let Some(api_key) = provider_config.gemini_api_key() else {
                bail!("No Gemini API key: set one in settings or export GEMINI_API_KEY")
            };
            let mut gemini = GeminiProvider::new(api_key)?;
            if let Some(base_url) = base_url {
                gemini = gemini.with_base_url(base_url.as_str());
            }
            Arc::new(gemini)
        }
        ProviderConfig::OpenRouter { api_key } => {
            if api_key.trim().is_empty() {
                bail!("OpenRouter API key is empty")
            }
            Arc::new(OpenRouterProvider::new(api_key.clone())?)
        }
        ProviderConfig::Mock { behavior } => Arc::new(MockProvider::new(behavior.clone())),
    };

    if !backend.supported_models().contains(&settings.model) {
        bail!(
            "Model {} is not supported by provider '{provider}' ({})",
            settings.model.name(),
            backend.name()
        )
    }
    Ok(backend)
}

/// Builds the settings' active provider.
pub fn create_active_provider(settings: &Settings) -> Result<Arc<dyn AiProvider>> {
    let Some(name) = settings.active_provider.as_deref() else {
        bail!("No active provider configured in settings")
    };
    create_provider(settings, name)
}
