//! Edge TTS provider
//!
//! Uses the installed `edge-tts` command-line tool as a subprocess.

use async_trait::async_trait;
use log::debug;
use std::io::Write;
use std::path::PathBuf;
use tokio::process::Command;

use crate::error::{Result, TtsError};
use crate::provider::{SynthesisRequest, TtsProvider};

/// Provider that uses the edge-tts CLI (subprocess)
pub struct EdgeTtsProvider {
    cli_path: PathBuf,
}

impl EdgeTtsProvider {
    /// Create a new edge-tts provider
    ///
    /// Returns an error if the edge-tts CLI is not found.
    pub fn new(cli_path: Option<PathBuf>) -> Result<Self> {
        let cli_path = match cli_path {
            Some(path) => {
                if !path.exists() {
                    return Err(TtsError::ProviderUnavailable(format!(
                        "edge-tts not found at specified path: {}",
                        path.display()
                    )));
                }
                path
            }
            None => which::which("edge-tts").map_err(|_| {
                TtsError::ProviderUnavailable(
                    "edge-tts not found. Install with: pip install edge-tts".into(),
                )
            })?,
        };

        Ok(Self { cli_path })
    }
}

#[async_trait]
impl TtsProvider for EdgeTtsProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<()> {
        // Chapter text can exceed argv limits, so it goes through a file
        let mut text_file = tempfile::NamedTempFile::new()?;
        text_file.write_all(request.text.as_bytes())?;
        text_file.flush()?;

        debug!(
            "edge-tts: {} chars -> {}",
            request.text.chars().count(),
            request.output_path.display()
        );

        let output = Command::new(&self.cli_path)
            .arg("--voice")
            .arg(&request.voice)
            .arg("--file")
            .arg(text_file.path())
            .arg("--write-media")
            .arg(&request.output_path)
            .output()
            .await
            .map_err(|e| TtsError::CliError(format!("Failed to execute: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("429") {
                return Err(TtsError::RateLimited { retry_after: None });
            }
            return Err(TtsError::CliError(format!(
                "Command failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "Edge TTS"
    }

    fn is_available(&self) -> Result<()> {
        // Availability was checked in constructor
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_path() {
        let result = EdgeTtsProvider::new(Some(PathBuf::from("/nonexistent/edge-tts")));
        match result {
            Err(TtsError::ProviderUnavailable(msg)) => {
                assert!(msg.contains("/nonexistent/edge-tts"));
            }
            _ => panic!("expected ProviderUnavailable"),
        }
    }
}
