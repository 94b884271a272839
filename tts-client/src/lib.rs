//! Shared text-to-speech client library for the audiolibro workspace
//!
//! Provides a unified interface for narration backends:
//! - Edge TTS (the `edge-tts` command-line tool, subprocess)
//! - OpenAI-compatible speech endpoints (HTTP)
//! - A scriptable mock for tests

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ProviderConfig};
pub use error::{Result, TtsError};
pub use provider::{SynthesisRequest, TtsProvider};
pub use providers::{MockProvider, ProviderKind, get_provider};
