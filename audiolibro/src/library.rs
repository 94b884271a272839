//! In-memory cache of analysed documents.

use crate::error::{Error, Result};
use crate::extract::{FileExtractor, TextExtractor};
use crate::text::{ChapterUnit, SegmentationResult, segment};
use chrono::{DateTime, Utc};
use log::info;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Length of a document id in hex characters.
const DOCUMENT_ID_LEN: usize = 8;

/// A document that has been extracted and segmented.
#[derive(Debug, Clone)]
pub struct AnalyzedDocument {
    pub id: String,
    pub path: PathBuf,
    /// Delimiter used for the current segmentation, if any
    pub delimiter: Option<String>,
    pub chapters: SegmentationResult,
    pub analyzed_at: DateTime<Utc>,
    text: Arc<String>,
}

impl AnalyzedDocument {
    /// File name as given, used for display.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// File stem, prefixed to every produced audio file.
    pub fn book_name(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audiolibro".to_string())
    }

    /// Selected chapters in document order; an empty selection means all.
    pub fn select(&self, ids: &[usize]) -> Vec<Arc<ChapterUnit>> {
        self.chapters.select(ids)
    }

    #[allow(dead_code)]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Analysed documents, keyed by document id, for the lifetime of the process.
pub struct DocumentStore {
    extractor: Box<dyn TextExtractor + Send + Sync>,
    documents: RwLock<HashMap<String, Arc<AnalyzedDocument>>>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::with_extractor(FileExtractor)
    }

    pub fn with_extractor(extractor: impl TextExtractor + Send + Sync + 'static) -> Self {
        Self {
            extractor: Box::new(extractor),
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Extract and segment a file with the default chapter markers.
    pub fn analyze(&self, path: &Path) -> Result<Arc<AnalyzedDocument>> {
        let text = self.extractor.extract(path)?;
        let chapters = segment(&text, None);
        info!(
            "Analyzed {}: {} chapter(s), {} chars",
            path.display(),
            chapters.len(),
            chapters.total_chars()
        );

        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        let id = fresh_id(&documents);
        let document = Arc::new(AnalyzedDocument {
            id: id.clone(),
            path: path.to_path_buf(),
            delimiter: None,
            chapters,
            analyzed_at: Utc::now(),
            text: Arc::new(text),
        });
        documents.insert(id, Arc::clone(&document));
        Ok(document)
    }

    /// Segment a cached document again, with a custom delimiter or the default markers.
    pub fn reanalyze(&self, id: &str, delimiter: Option<&str>) -> Result<Arc<AnalyzedDocument>> {
        let previous = self.get(id)?;

        let text = if previous.text.is_empty() {
            Arc::new(self.extractor.extract(&previous.path)?)
        } else {
            Arc::clone(&previous.text)
        };

        let delimiter = delimiter
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let chapters = segment(&text, delimiter.as_deref());
        info!(
            "Re-analyzed {} with {}: {} chapter(s)",
            previous.filename(),
            delimiter
                .as_deref()
                .map(|d| format!("delimiter {:?}", d))
                .unwrap_or_else(|| "default markers".to_string()),
            chapters.len()
        );

        let document = Arc::new(AnalyzedDocument {
            id: previous.id.clone(),
            path: previous.path.clone(),
            delimiter,
            chapters,
            analyzed_at: Utc::now(),
            text,
        });
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(document.id.clone(), Arc::clone(&document));
        Ok(document)
    }

    pub fn get(&self, id: &str) -> Result<Arc<AnalyzedDocument>> {
        self.documents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| Error::document_not_found(id))
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.documents.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn fresh_id(documents: &HashMap<String, Arc<AnalyzedDocument>>) -> String {
    loop {
        let id = uuid::Uuid::new_v4().simple().to_string()[..DOCUMENT_ID_LEN].to_string();
        if !documents.contains_key(&id) {
            return id;
        }
    }
}
