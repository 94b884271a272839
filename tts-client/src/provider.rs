use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;

/// A single narration request: speak `text` with `voice`, write audio to `output_path`
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: String,
    pub output_path: PathBuf,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            output_path: output_path.into(),
        }
    }
}

/// Trait for narration backends
///
/// Calls may be slow (seconds per request) and rate-limited upstream.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Synthesize the request's text into an audio file at its output path
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<()>;

    /// Get the provider name for display
    fn name(&self) -> &'static str;

    /// Check if the provider is available (API key set, CLI installed, etc.)
    fn is_available(&self) -> Result<()>;
}
