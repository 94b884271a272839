//! Plain-text extraction from TXT, EPUB and PDF files.

mod epub;
mod pdf;

use log::debug;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0} (expected .txt, .pdf or .epub)")]
    Unsupported(String),

    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open EPUB: {0}")]
    Epub(String),

    #[error("{0} not found in PATH (needed to read PDF files)")]
    MissingTool(&'static str),

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: &'static str, message: String },
}

/// Turns a document on disk into plain text.
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// Document kinds recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Epub,
    Pdf,
}

impl DocumentKind {
    /// Detect the kind from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Ok(Self::Text),
            "epub" => Ok(Self::Epub),
            "pdf" => Ok(Self::Pdf),
            _ => Err(ExtractionError::Unsupported(if ext.is_empty() {
                path.display().to_string()
            } else {
                format!(".{}", ext)
            })),
        }
    }
}

/// Extractor that dispatches on the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileExtractor;

impl TextExtractor for FileExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let kind = DocumentKind::from_path(path)?;
        debug!("Extracting {:?} text from {}", kind, path.display());

        let text = match kind {
            DocumentKind::Text => read_text(path)?,
            DocumentKind::Epub => epub::extract(path)?,
            DocumentKind::Pdf => pdf::extract(path)?,
        };

        debug!("Extracted {} chars", text.chars().count());
        Ok(text)
    }
}

fn read_text(path: &Path) -> Result<String, ExtractionError> {
    let text = fs::read_to_string(path)?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
