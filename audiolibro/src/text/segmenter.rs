//! Chapter segmentation: split a document's text into chapter units.
//!
//! Three strategies, tried in order:
//! 1. A caller-supplied literal delimiter ("Part N" titles).
//! 2. The default chapter markers ("Chapter N" titles).
//! 3. Fixed-size windows when neither finds a boundary ("part_NNN" titles).

use super::{ChapterUnit, SegmentationResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Window size, in characters, for documents without chapter markers.
pub const FALLBACK_CHUNK_CHARS: usize = 5000;

/// Title of the single unit produced for a blank document.
pub const WHOLE_DOCUMENT_TITLE: &str = "completo";

/// A chapter heading pattern: a heading word followed by a chapter number.
#[derive(Debug, Clone, Copy)]
pub struct MarkerPattern {
    /// Regex fragment, matched case-insensitively
    pub pattern: &'static str,
}

/// Default markers, highest priority first. English and Spanish spellings.
pub const DEFAULT_MARKERS: &[MarkerPattern] = &[
    MarkerPattern { pattern: r"CHAPTER\s+\d+" },
    MarkerPattern { pattern: r"CAP[IÍ]TULO\s+\d+" },
    MarkerPattern { pattern: r"PARTE?\s+\d+" },
    MarkerPattern { pattern: r"SECTION\s+\d+" },
    MarkerPattern { pattern: r"SECCI[OÓ]N\s+\d+" },
];

static DEFAULT_MARKER_SET: Lazy<MarkerSet> = Lazy::new(|| {
    MarkerSet::new(DEFAULT_MARKERS).expect("default chapter markers should compile")
});

static DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("digit pattern should compile"));

/// An ordered set of marker patterns compiled into one scanner.
///
/// Patterns are joined as a leftmost-first alternation, so at any scan
/// position the earliest-listed pattern that matches wins and matches never
/// overlap.
#[derive(Debug, Clone)]
pub struct MarkerSet {
    regex: Regex,
}

impl MarkerSet {
    pub fn new(markers: &[MarkerPattern]) -> Result<Self, regex::Error> {
        let alternation = markers
            .iter()
            .map(|m| format!("(?:{})", m.pattern))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&format!("(?i){}", alternation))?;
        Ok(Self { regex })
    }

    /// The built-in English/Spanish marker set.
    pub fn default_set() -> &'static MarkerSet {
        &DEFAULT_MARKER_SET
    }

    /// (start, end) byte offsets of every marker, left to right.
    fn find_boundaries(&self, text: &str) -> Vec<(usize, usize)> {
        self.regex
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}

/// Split `text` into chapter units.
///
/// A non-blank `custom_delimiter` is matched literally (after trimming);
/// otherwise the default markers are used. Total: always yields at least one unit.
pub fn segment(text: &str, custom_delimiter: Option<&str>) -> SegmentationResult {
    let delimiter = custom_delimiter.map(str::trim).filter(|d| !d.is_empty());

    match delimiter {
        Some(delimiter) => segment_by_delimiter(text, delimiter),
        None => segment_with_markers(text, MarkerSet::default_set()),
    }
}

/// Split `text` at every marker of `markers`, titling units "Chapter N".
pub fn segment_with_markers(text: &str, markers: &MarkerSet) -> SegmentationResult {
    let boundaries = markers.find_boundaries(text);
    if boundaries.is_empty() {
        return chunk_fixed(text);
    }

    let units = split_at(text, &boundaries)
        .enumerate()
        .map(|(i, ((start, end), content))| {
            let number = DIGITS
                .find(&text[start..end])
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| (i + 1).to_string());
            ChapterUnit::new(i, format!("Chapter {}", number), content)
        })
        .collect();

    SegmentationResult::from_units(units)
}

fn segment_by_delimiter(text: &str, delimiter: &str) -> SegmentationResult {
    let boundaries: Vec<(usize, usize)> = text
        .match_indices(delimiter)
        .map(|(start, m)| (start, start + m.len()))
        .collect();
    if boundaries.is_empty() {
        return chunk_fixed(text);
    }

    let units = split_at(text, &boundaries)
        .enumerate()
        .map(|(i, (_, content))| ChapterUnit::new(i, format!("Part {}", i + 1), content))
        .collect();

    SegmentationResult::from_units(units)
}

/// Pair each boundary with the trimmed text between its end and the next start.
///
/// Text before the first boundary is discarded.
fn split_at<'a>(
    text: &'a str,
    boundaries: &'a [(usize, usize)],
) -> impl Iterator<Item = ((usize, usize), &'a str)> + 'a {
    boundaries.iter().enumerate().map(move |(i, &(start, end))| {
        let next = boundaries.get(i + 1).map_or(text.len(), |&(s, _)| s);
        ((start, end), text[end..next].trim())
    })
}

/// Slice the trimmed text into contiguous windows of `FALLBACK_CHUNK_CHARS`.
fn chunk_fixed(text: &str) -> SegmentationResult {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return SegmentationResult::from_units(vec![ChapterUnit::new(
            0,
            WHOLE_DOCUMENT_TITLE,
            text,
        )]);
    }

    let mut units = Vec::new();
    let mut window_start = 0;
    let mut chars_in_window = 0;

    for (offset, _) in trimmed.char_indices() {
        if chars_in_window == FALLBACK_CHUNK_CHARS {
            units.push(window_unit(units.len(), &trimmed[window_start..offset]));
            window_start = offset;
            chars_in_window = 0;
        }
        chars_in_window += 1;
    }
    units.push(window_unit(units.len(), &trimmed[window_start..]));

    SegmentationResult::from_units(units)
}

fn window_unit(id: usize, content: &str) -> ChapterUnit {
    ChapterUnit::new(id, format!("part_{:03}", id + 1), content)
}
