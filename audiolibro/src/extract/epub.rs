// EPUB text extraction

use super::ExtractionError;
use log::debug;
use std::path::Path;

/// Plain text of every spine document, in reading order.
pub fn extract(path: &Path) -> Result<String, ExtractionError> {
    let mut doc =
        ::epub::doc::EpubDoc::new(path).map_err(|e| ExtractionError::Epub(e.to_string()))?;

    let spine = doc.spine.clone();
    let mut sections = Vec::new();

    for spine_item in spine.iter() {
        let Some((content_bytes, _mime)) = doc.get_resource(&spine_item.idref) else {
            debug!("Spine item {} has no resource", spine_item.idref);
            continue;
        };

        let html = String::from_utf8_lossy(&content_bytes);
        let text = html_to_text(&html);

        // Skip cover pages and other empty documents
        if text.trim().is_empty() {
            continue;
        }
        sections.push(text);
    }

    Ok(sections.join("\n\n"))
}

/// Convert HTML to plain text
fn html_to_text(html: &str) -> String {
    let text = html2text::from_read(html.as_bytes(), 1000);
    clean_text(&text)
}

/// Join wrapped lines, keep paragraph breaks, decode leftover entities
fn clean_text(text: &str) -> String {
    let mut result = String::new();
    let mut prev_was_blank = false;

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if !prev_was_blank && !result.is_empty() {
                result.push_str("\n\n");
                prev_was_blank = true;
            }
            continue;
        }

        prev_was_blank = false;

        if !result.is_empty() && !result.ends_with('\n') {
            result.push(' ');
        }

        result.push_str(trimmed);
    }

    result
        .trim_end()
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&hellip;", "...")
}
