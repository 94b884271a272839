//! Conversion worker: drives one job's chapters through the narration service.

use super::registry::{AUDIO_EXTENSION, JobWriter};
use super::types::JobStatus;
use crate::error::Result;
use crate::text::{ChapterUnit, sanitize};
use crate::voices::Voice;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tts_client::{SynthesisRequest, TtsProvider};

/// Chapters whose sanitized text is shorter than this are not narrated.
pub const MIN_NARRATABLE_CHARS: usize = 50;

const PAUSE_TICK: Duration = Duration::from_secs(1);

/// Periodic idle window that keeps the job under upstream rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Chapters converted between pauses (0 disables pausing)
    pub every: usize,
    /// Length of each pause
    pub pause_seconds: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            every: 15,
            pause_seconds: 90,
        }
    }
}

impl BackoffPolicy {
    /// Whether to pause before starting the chapter at 1-based position `idx`.
    pub fn should_pause_before(&self, idx: usize) -> bool {
        self.every > 0 && idx > 1 && (idx - 1) % self.every == 0
    }
}

/// Everything a worker needs to convert one selection of chapters.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Chapters in the order they should be narrated
    pub chapters: Vec<Arc<ChapterUnit>>,
    pub voice: Voice,
    pub output_directory: PathBuf,
    /// Base name of the source document, prefixed to every output file
    pub book_name: String,
}

/// Output file name for a chapter: `{book}_{title, lowercased, spaces as underscores}.mp3`.
pub fn output_filename(book_name: &str, chapter_title: &str) -> String {
    format!(
        "{}_{}.{}",
        book_name,
        chapter_title.to_lowercase().replace(' ', "_"),
        AUDIO_EXTENSION
    )
}

/// Output file names shared by more than one chapter of the selection, in first-seen order.
///
/// Markers of different kinds with the same number ("PART 1", "CHAPTER 1")
/// produce the same title, so the later chapter overwrites the earlier file.
pub fn colliding_filenames(book_name: &str, chapters: &[Arc<ChapterUnit>]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut colliding = Vec::new();
    for chapter in chapters {
        let name = output_filename(book_name, &chapter.title);
        if !seen.insert(name.clone()) && !colliding.contains(&name) {
            colliding.push(name);
        }
    }
    colliding
}

/// Sole writer of one job's record.
pub struct ConversionWorker {
    writer: JobWriter,
    provider: Arc<dyn TtsProvider>,
    policy: BackoffPolicy,
    min_chars: usize,
}

impl ConversionWorker {
    pub fn new(writer: JobWriter, provider: Arc<dyn TtsProvider>, policy: BackoffPolicy) -> Self {
        Self {
            writer,
            provider,
            policy,
            min_chars: MIN_NARRATABLE_CHARS,
        }
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Convert every chapter, then record the terminal status.
    ///
    /// Errors never escape: they end the job as `Failed` with the message recorded.
    pub async fn run(self, request: ConversionRequest) {
        let job_id = self.writer.id().clone();
        info!(
            "Job {}: converting {} chapter(s) with {} via {}",
            job_id,
            request.chapters.len(),
            request.voice.id,
            self.provider.name()
        );

        match self.convert(&request).await {
            Ok(()) => {
                let output_directory = request.output_directory.clone();
                self.writer.update(|r| {
                    r.status = JobStatus::Completed;
                    r.output_directory = Some(output_directory);
                });
                info!("Job {}: completed", job_id);
            }
            Err(e) => {
                let message = e.to_string();
                error!("Job {}: failed: {}", job_id, message);
                self.writer.update(|r| {
                    r.status = JobStatus::Failed;
                    r.pause_remaining_seconds = None;
                    r.error_message = Some(message);
                });
            }
        }
    }

    async fn convert(&self, request: &ConversionRequest) -> Result<()> {
        let total = request.chapters.len();
        self.writer.update(|r| {
            r.status = JobStatus::Running;
            r.total_chapters = total;
            r.completed_chapter_ids.clear();
        });

        tokio::fs::create_dir_all(&request.output_directory).await?;

        for name in colliding_filenames(&request.book_name, &request.chapters) {
            warn!(
                "Job {}: several chapters write {}; only the last one is kept",
                self.writer.id(),
                name
            );
        }

        for (i, chapter) in request.chapters.iter().enumerate() {
            let idx = i + 1;

            if self.policy.should_pause_before(idx) {
                self.pause().await;
            }

            self.writer.update(|r| {
                r.current_index = idx;
                r.current_chapter_title = chapter.title.clone();
            });

            let text = sanitize(&chapter.content);
            let chars = text.chars().count();
            if chars < self.min_chars {
                debug!(
                    "[{}/{}] {}: {} chars, nothing to narrate",
                    idx, total, chapter.title, chars
                );
                self.mark_complete(chapter.id);
                continue;
            }

            let output_path = request
                .output_directory
                .join(output_filename(&request.book_name, &chapter.title));
            debug!(
                "[{}/{}] {}: {} chars -> {}",
                idx,
                total,
                chapter.title,
                chars,
                output_path.display()
            );

            let synthesis = SynthesisRequest::new(text, &request.voice.id, output_path);
            self.provider.synthesize(&synthesis).await?;
            self.mark_complete(chapter.id);
        }

        Ok(())
    }

    fn mark_complete(&self, chapter_id: usize) {
        self.writer.update(|r| r.completed_chapter_ids.push(chapter_id));
    }

    /// Idle for the policy's pause, publishing the countdown every second.
    async fn pause(&self) {
        let mut remaining = self.policy.pause_seconds;
        info!(
            "Job {}: pausing {}s to avoid rate limiting",
            self.writer.id(),
            remaining
        );

        self.writer.update(|r| {
            r.status = JobStatus::Paused;
            r.pause_remaining_seconds = Some(remaining);
        });

        while remaining > 1 {
            tokio::time::sleep(PAUSE_TICK).await;
            remaining -= 1;
            self.writer
                .update(|r| r.pause_remaining_seconds = Some(remaining));
        }
        if remaining == 1 {
            tokio::time::sleep(PAUSE_TICK).await;
            self.writer.update(|r| r.pause_remaining_seconds = Some(0));
        }

        self.writer.update(|r| {
            r.status = JobStatus::Running;
            r.pause_remaining_seconds = None;
        });
    }
}
