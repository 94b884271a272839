//! Mock TTS provider for testing
//!
//! Provides a configurable mock provider that can simulate slow calls,
//! upstream failures, and successful synthesis.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{Result, TtsError};
use crate::provider::{SynthesisRequest, TtsProvider};

/// Bytes written to the output path on a successful call
pub const MOCK_AUDIO: &[u8] = b"ID3mock-audio";

/// When the mock should fail
#[derive(Debug, Clone, Copy)]
enum FailureMode {
    Never,
    Always,
    /// Fail only on this call number (1-based)
    OnCall(usize),
}

/// A mock provider for testing job pipelines without a narration service
pub struct MockProvider {
    mode: FailureMode,
    /// Message carried by the simulated upstream error
    fail_message: String,
    /// Simulated service latency per call
    latency: Option<Duration>,
    /// Current call count
    call_count: AtomicUsize,
    /// Every request received, in call order
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl MockProvider {
    fn with_mode(mode: FailureMode, fail_message: &str) -> Self {
        Self {
            mode,
            fail_message: fail_message.to_string(),
            latency: None,
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that always succeeds
    pub fn always_succeeds() -> Self {
        Self::with_mode(FailureMode::Never, "")
    }

    /// Create a provider that always fails with the given message
    pub fn always_fails(message: &str) -> Self {
        Self::with_mode(FailureMode::Always, message)
    }

    /// Create a provider that fails on the `n`-th call (1-based) and succeeds otherwise
    pub fn fails_on_call(n: usize, message: &str) -> Self {
        Self::with_mode(FailureMode::OnCall(n), message)
    }

    /// Sleep for `latency` on every call before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get a copy of every request received so far
    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl TtsProvider for MockProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<()> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let fail = match self.mode {
            FailureMode::Never => false,
            FailureMode::Always => true,
            FailureMode::OnCall(n) => call_num == n,
        };

        if fail {
            return Err(TtsError::ApiError {
                message: self.fail_message.clone(),
                status_code: Some(503),
            });
        }

        tokio::fs::write(&request.output_path, MOCK_AUDIO).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_in(dir: &std::path::Path, name: &str) -> SynthesisRequest {
        SynthesisRequest::new("Hola mundo", "es-MX-JorgeNeural", dir.join(name))
    }

    #[tokio::test]
    async fn test_always_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::always_succeeds();

        let request = request_in(dir.path(), "a.mp3");
        provider.synthesize(&request).await.unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(std::fs::read(&request.output_path).unwrap(), MOCK_AUDIO);
        assert_eq!(provider.requests()[0].voice, "es-MX-JorgeNeural");
    }

    #[tokio::test]
    async fn test_always_fails() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::always_fails("service down");

        for i in 0..3 {
            let request = request_in(dir.path(), &format!("{}.mp3", i));
            let err = provider.synthesize(&request).await.unwrap_err();
            assert!(err.to_string().contains("service down"));
            assert!(!request.output_path.exists());
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fails_on_call() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::fails_on_call(2, "boom");

        assert!(provider.synthesize(&request_in(dir.path(), "1.mp3")).await.is_ok());
        assert!(provider.synthesize(&request_in(dir.path(), "2.mp3")).await.is_err());
        assert!(provider.synthesize(&request_in(dir.path(), "3.mp3")).await.is_ok());
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::always_succeeds().with_latency(Duration::from_secs(5));

        let start = tokio::time::Instant::now();
        provider.synthesize(&request_in(dir.path(), "slow.mp3")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
