use super::registry::JobRegistry;
use super::types::{JobId, JobRecord};
use super::worker::{BackoffPolicy, ConversionRequest, ConversionWorker, MIN_NARRATABLE_CHARS};
use crate::error::{Error, Result};
use log::info;
use std::sync::Arc;
use tts_client::TtsProvider;

/// Accepts conversion requests and runs each on its own background task.
pub struct Dispatcher {
    registry: Arc<JobRegistry>,
    provider: Arc<dyn TtsProvider>,
    policy: BackoffPolicy,
    min_chars: usize,
}

impl Dispatcher {
    pub fn new(registry: Arc<JobRegistry>, provider: Arc<dyn TtsProvider>) -> Self {
        Self {
            registry,
            provider,
            policy: BackoffPolicy::default(),
            min_chars: MIN_NARRATABLE_CHARS,
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Register a pending job and start its worker.
    ///
    /// Returns as soon as the job is registered; conversion continues in the
    /// background. Must be called from within a tokio runtime.
    pub fn submit(&self, request: ConversionRequest) -> Result<JobId> {
        if request.chapters.is_empty() {
            return Err(Error::EmptySelection);
        }

        let record = JobRecord::new(request.chapters.len(), request.voice.label.clone());
        let writer = self.registry.create(record);
        let id = writer.id().clone();

        info!(
            "Submitted job {} ({} chapter(s), voice {})",
            id,
            request.chapters.len(),
            request.voice.label
        );

        let worker = ConversionWorker::new(writer, Arc::clone(&self.provider), self.policy)
            .with_min_chars(self.min_chars);
        tokio::spawn(worker.run(request));

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::types::JobStatus;
    use crate::text::ChapterUnit;
    use crate::voices;
    use std::path::Path;
    use std::time::Duration;
    use tts_client::MockProvider;

    const LONG_TEXT: &str =
        "El viejo faro seguía encendido cada noche aunque ningún barco pasara ya por la bahía.";

    fn request(count: usize, dir: &Path) -> ConversionRequest {
        ConversionRequest {
            chapters: (0..count)
                .map(|i| Arc::new(ChapterUnit::new(i, format!("Chapter {}", i + 1), LONG_TEXT)))
                .collect(),
            voice: voices::resolve("dalia"),
            output_directory: dir.to_path_buf(),
            book_name: "faro".to_string(),
        }
    }

    async fn wait_for_terminal(registry: &JobRegistry, id: &JobId) -> JobRecord {
        let mut rx = registry.subscribe(id).unwrap();
        loop {
            {
                let record = rx.borrow_and_update();
                if record.status.is_terminal() {
                    return record.clone();
                }
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }

    #[tokio::test]
    async fn test_empty_selection_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(JobRegistry::new());
        let dispatcher = Dispatcher::new(registry.clone(), Arc::new(MockProvider::always_succeeds()));

        let result = dispatcher.submit(request(0, dir.path()));
        assert!(matches!(result, Err(Error::EmptySelection)));
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_returns_before_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(JobRegistry::new());
        let provider =
            Arc::new(MockProvider::always_succeeds().with_latency(Duration::from_secs(30)));
        let dispatcher = Dispatcher::new(registry.clone(), provider.clone());

        let id = dispatcher.submit(request(2, dir.path())).unwrap();
        let record = registry.get_status(&id).unwrap();
        assert!(!record.status.is_terminal());
        assert_eq!(record.total_chapters, 2);
        assert_eq!(record.voice_label, "Dalia");

        let done = wait_for_terminal(&registry, &id).await;
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.completed_chapter_ids, vec![0, 1]);
        assert_eq!(provider.call_count(), 2);
        assert_eq!(registry.list_outputs(&id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_job_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(JobRegistry::new());
        let dispatcher = Dispatcher::new(
            registry.clone(),
            Arc::new(MockProvider::always_fails("service down")),
        );

        let id = dispatcher.submit(request(3, dir.path())).unwrap();
        let done = wait_for_terminal(&registry, &id).await;
        assert_eq!(done.status, JobStatus::Failed);
        assert!(done.completed_chapter_ids.is_empty());
        assert!(done.error_message.unwrap().contains("service down"));
    }

    #[tokio::test]
    async fn test_concurrent_jobs_are_independent() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let registry = Arc::new(JobRegistry::new());
        let dispatcher = Dispatcher::new(registry.clone(), Arc::new(MockProvider::always_succeeds()))
            .with_min_chars(10);

        let a = dispatcher.submit(request(1, dir_a.path())).unwrap();
        let b = dispatcher.submit(request(3, dir_b.path())).unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        let done_a = wait_for_terminal(&registry, &a).await;
        let done_b = wait_for_terminal(&registry, &b).await;
        assert_eq!(done_a.completed_chapter_ids, vec![0]);
        assert_eq!(done_b.completed_chapter_ids, vec![0, 1, 2]);
        assert_eq!(registry.list_outputs(&a).unwrap().len(), 1);
        assert_eq!(registry.list_outputs(&b).unwrap().len(), 3);
    }
}
