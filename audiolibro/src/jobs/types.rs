//! Job data types for chapter conversion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Unique job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    #[allow(dead_code)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle of a conversion job.
///
/// `Pending -> Running <-> Paused -> Completed | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Submitted, worker not started yet.
    Pending,
    /// Converting chapters.
    Running,
    /// Idle in a rate-limit backoff window.
    Paused,
    /// Every selected chapter done.
    Completed,
    /// Aborted on the first error.
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Progress snapshot of one job, as seen by status pollers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub status: JobStatus,
    /// Number of selected chapters
    pub total_chapters: usize,
    /// 1-based position of the chapter in progress, 0 before start
    pub current_index: usize,
    pub current_chapter_title: String,
    /// Ids of finished chapters, in completion order (append-only)
    pub completed_chapter_ids: Vec<usize>,
    /// Seconds left in the current backoff window
    pub pause_remaining_seconds: Option<u64>,
    /// Set once the job completes
    pub output_directory: Option<PathBuf>,
    /// Set once the job fails
    pub error_message: Option<String>,
    /// Display name of the narrator voice
    pub voice_label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a pending record.
    pub fn new(total_chapters: usize, voice_label: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            status: JobStatus::Pending,
            total_chapters,
            current_index: 0,
            current_chapter_title: String::new(),
            completed_chapter_ids: Vec::new(),
            pause_remaining_seconds: None,
            output_directory: None,
            error_message: None,
            voice_label: voice_label.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Completed chapters as a percentage of the selection.
    pub fn percent_complete(&self) -> f64 {
        if self.total_chapters == 0 {
            return 0.0;
        }
        self.completed_chapter_ids.len() as f64 / self.total_chapters as f64 * 100.0
    }
}

/// A produced audio file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub filename: String,
    pub size_bytes: u64,
}
