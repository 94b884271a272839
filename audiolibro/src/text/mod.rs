//! Text processing for narration: chapter segmentation and sanitization.

mod sanitizer;
pub mod segmenter;

pub use sanitizer::sanitize;
pub use segmenter::segment;

use serde::Serialize;
use std::sync::Arc;

/// One addressable, independently narratable slice of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterUnit {
    /// Position in the segmentation run (0-based, contiguous)
    pub id: usize,
    /// Human-readable title, e.g. "Chapter 12" or "Part 3"
    pub title: String,
    /// Character count of the trimmed content
    pub char_count: usize,
    /// The chapter text, delimiter excluded
    #[serde(skip)]
    pub content: String,
}

impl ChapterUnit {
    /// Create a chapter unit, computing its character count.
    pub fn new(id: usize, title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id,
            title: title.into(),
            char_count: content.trim().chars().count(),
            content,
        }
    }
}

/// Ordered chapter units of one document, in document order.
///
/// Units are shared, so job chapter lists reference them instead of copying text.
#[derive(Debug, Clone, Default)]
pub struct SegmentationResult {
    units: Vec<Arc<ChapterUnit>>,
}

impl SegmentationResult {
    pub(crate) fn from_units(units: Vec<ChapterUnit>) -> Self {
        Self {
            units: units.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ChapterUnit>> {
        self.units.iter()
    }

    #[allow(dead_code)]
    pub fn get(&self, id: usize) -> Option<&Arc<ChapterUnit>> {
        self.units.get(id)
    }

    /// Units whose ids appear in `ids`, in document order.
    ///
    /// An empty `ids` selects every unit. Unknown ids are ignored.
    pub fn select(&self, ids: &[usize]) -> Vec<Arc<ChapterUnit>> {
        self.units
            .iter()
            .filter(|u| ids.is_empty() || ids.contains(&u.id))
            .cloned()
            .collect()
    }

    /// Total characters across all units.
    pub fn total_chars(&self) -> usize {
        self.units.iter().map(|u| u.char_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_unit_counts_trimmed_chars() {
        let unit = ChapterUnit::new(0, "Chapter 1", "  ñandú \n");
        assert_eq!(unit.char_count, 5);
        assert_eq!(unit.content, "  ñandú \n");
    }

    #[test]
    fn test_select_keeps_document_order() {
        let result = SegmentationResult::from_units(vec![
            ChapterUnit::new(0, "Part 1", "a"),
            ChapterUnit::new(1, "Part 2", "b"),
            ChapterUnit::new(2, "Part 3", "c"),
        ]);

        let selected = result.select(&[2, 0, 7]);
        let ids: Vec<usize> = selected.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![0, 2]);

        // Selection shares the units rather than copying them
        assert!(Arc::ptr_eq(&selected[0], result.get(0).unwrap()));
    }

    #[test]
    fn test_select_empty_means_all() {
        let result = SegmentationResult::from_units(vec![
            ChapterUnit::new(0, "Part 1", "a"),
            ChapterUnit::new(1, "Part 2", "b"),
        ]);
        assert_eq!(result.select(&[]).len(), 2);
        assert_eq!(result.total_chars(), 2);
    }
}
