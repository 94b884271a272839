//! In-memory job registry.
//!
//! Each job's record lives in its own watch channel. The registry keeps the
//! receiving side for pollers; the single sending side is the `JobWriter`
//! handed to the job's worker. Every update publishes a whole record, so
//! readers never observe a half-applied change.

use super::types::{JobId, JobRecord, OutputFile};
use crate::error::{Error, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::sync::RwLock;
use tokio::sync::watch;

/// Extension of the audio files a job produces.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Store of every job submitted during this process's lifetime.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, watch::Receiver<JobRecord>>>,
}

/// Exclusive write access to one job's record.
///
/// Not `Clone`: exactly one writer exists per job.
#[derive(Debug)]
pub struct JobWriter {
    id: JobId,
    tx: watch::Sender<JobRecord>,
}

impl JobWriter {
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Apply `f` to the record and publish the result as one snapshot.
    pub fn update(&self, f: impl FnOnce(&mut JobRecord)) {
        self.tx.send_modify(|record| {
            f(record);
            record.updated_at = Utc::now();
        });
    }

    /// Current state of the record.
    #[allow(dead_code)]
    pub fn snapshot(&self) -> JobRecord {
        self.tx.borrow().clone()
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job and return the writer for its record.
    pub fn create(&self, record: JobRecord) -> JobWriter {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());

        let mut id = JobId::generate();
        while jobs.contains_key(&id) {
            id = JobId::generate();
        }

        let (tx, rx) = watch::channel(record);
        jobs.insert(id.clone(), rx);
        JobWriter { id, tx }
    }

    /// Latest published record of a job.
    pub fn get_status(&self, id: &JobId) -> Result<JobRecord> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(id)
            .map(|rx| rx.borrow().clone())
            .ok_or_else(|| Error::job_not_found(id))
    }

    /// A receiver that is notified on every update of a job's record.
    pub fn subscribe(&self, id: &JobId) -> Result<watch::Receiver<JobRecord>> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(id).cloned().ok_or_else(|| Error::job_not_found(id))
    }

    /// Audio files in the job's output directory, sorted by name.
    ///
    /// Empty until the job has recorded an output directory.
    pub fn list_outputs(&self, id: &JobId) -> Result<Vec<OutputFile>> {
        let record = self.get_status(id)?;
        let Some(dir) = record.output_directory else {
            return Ok(Vec::new());
        };
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut outputs = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|e| e == AUDIO_EXTENSION).unwrap_or(false) {
                outputs.push(OutputFile {
                    filename: entry.file_name().to_string_lossy().into_owned(),
                    size_bytes: entry.metadata()?.len(),
                });
            }
        }

        outputs.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(outputs)
    }

    /// Number of jobs registered.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::types::JobStatus;

    #[test]
    fn test_create_and_get_status() {
        let registry = JobRegistry::new();
        let writer = registry.create(JobRecord::new(3, "Jorge"));

        let status = registry.get_status(writer.id()).unwrap();
        assert_eq!(status.status, JobStatus::Pending);
        assert_eq!(status.total_chapters, 3);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_job() {
        let registry = JobRegistry::new();
        let id = JobId::from("missing");
        assert!(matches!(
            registry.get_status(&id),
            Err(Error::NotFound { kind: "Job", .. })
        ));
        assert!(registry.list_outputs(&id).is_err());
        assert!(registry.subscribe(&id).is_err());
    }

    #[test]
    fn test_update_is_visible_to_readers() {
        let registry = JobRegistry::new();
        let writer = registry.create(JobRecord::new(2, "Jorge"));
        let before = registry.get_status(writer.id()).unwrap().updated_at;

        writer.update(|r| {
            r.status = JobStatus::Running;
            r.current_index = 1;
            r.current_chapter_title = "Chapter 1".to_string();
        });

        let status = registry.get_status(writer.id()).unwrap();
        assert_eq!(status.status, JobStatus::Running);
        assert_eq!(status.current_index, 1);
        assert_eq!(status.current_chapter_title, "Chapter 1");
        assert!(status.updated_at >= before);
        assert_eq!(writer.snapshot(), status);
    }

    #[test]
    fn test_jobs_are_independent() {
        let registry = JobRegistry::new();
        let a = registry.create(JobRecord::new(1, "Jorge"));
        let b = registry.create(JobRecord::new(5, "Dalia"));
        assert_ne!(a.id(), b.id());

        a.update(|r| r.status = JobStatus::Failed);
        assert_eq!(registry.get_status(b.id()).unwrap().status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn test_subscribe_sees_updates() {
        let registry = JobRegistry::new();
        let writer = registry.create(JobRecord::new(1, "Jorge"));
        let mut rx = registry.subscribe(writer.id()).unwrap();
        rx.borrow_and_update();

        writer.update(|r| r.status = JobStatus::Running);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().status, JobStatus::Running);
    }

    #[test]
    fn test_list_outputs_without_directory() {
        let registry = JobRegistry::new();
        let writer = registry.create(JobRecord::new(1, "Jorge"));
        assert!(registry.list_outputs(writer.id()).unwrap().is_empty());
    }

    #[test]
    fn test_list_outputs_sorted_mp3_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("libro_chapter_2.mp3"), b"12345").unwrap();
        fs::write(dir.path().join("libro_chapter_1.mp3"), b"123").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let registry = JobRegistry::new();
        let writer = registry.create(JobRecord::new(2, "Jorge"));
        writer.update(|r| r.output_directory = Some(dir.path().to_path_buf()));

        let outputs = registry.list_outputs(writer.id()).unwrap();
        assert_eq!(
            outputs,
            vec![
                OutputFile {
                    filename: "libro_chapter_1.mp3".to_string(),
                    size_bytes: 3,
                },
                OutputFile {
                    filename: "libro_chapter_2.mp3".to_string(),
                    size_bytes: 5,
                },
            ]
        );
    }
}
