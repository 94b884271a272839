//! TTS provider implementations

mod edge_tts;
pub mod mock;
mod openai_speech;

pub use edge_tts::EdgeTtsProvider;
pub use mock::MockProvider;
pub use openai_speech::OpenAiSpeechProvider;

use crate::config::{Config, ProviderConfig};
use crate::error::{Result, TtsError};
use crate::provider::TtsProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    EdgeTts,
    OpenAi,
}

impl ProviderKind {
    /// Parse provider kind from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "edge-tts" | "edge_tts" | "edge" => Ok(Self::EdgeTts),
            "openai" | "openai-speech" => Ok(Self::OpenAi),
            _ => Err(TtsError::UnknownProvider(s.to_string())),
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            Self::EdgeTts => None,
            Self::OpenAi => Some("OPENAI_API_KEY"),
        }
    }

    /// Human-readable provider name for error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::EdgeTts => "Edge TTS",
            Self::OpenAi => "OpenAI",
        }
    }
}

/// Create a provider instance by name, using `config` for provider settings
///
/// `name` of `None` selects the config's default provider.
pub fn get_provider(name: Option<&str>, config: &Config) -> Result<Box<dyn TtsProvider>> {
    let name = name.unwrap_or(&config.default_provider);
    let kind = ProviderKind::from_str(name)?;
    let provider_config = config.get_provider_config(name);

    match kind {
        ProviderKind::EdgeTts => {
            let cli_path = provider_config.and_then(|c| c.cli_path.clone());
            Ok(Box::new(EdgeTtsProvider::new(cli_path)?))
        }
        ProviderKind::OpenAi => {
            let api_key = get_api_key(provider_config, kind)?;
            let base_url = provider_config.and_then(|c| c.base_url.clone());
            let model = provider_config.and_then(|c| c.model.clone());
            Ok(Box::new(OpenAiSpeechProvider::new(
                api_key,
                base_url.as_deref(),
                model.as_deref(),
            )?))
        }
    }
}

/// Get API key from config, falling back to the provider's environment variable
fn get_api_key(config: Option<&ProviderConfig>, kind: ProviderKind) -> Result<String> {
    let env_var = kind.env_var().ok_or_else(|| {
        TtsError::ConfigError(format!("{} does not use an API key", kind.display_name()))
    })?;

    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Ok(key);
    }

    api_key_from_env(env_var, kind.display_name())
}

fn api_key_from_env(env_var: &str, provider_name: &str) -> Result<String> {
    std::env::var(env_var).map_err(|_| TtsError::MissingApiKey {
        provider: provider_name.to_string(),
        env_var: env_var.to_string(),
    })
}
