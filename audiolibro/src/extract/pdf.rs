// PDF text extraction through poppler's pdftotext

use super::ExtractionError;
use log::debug;
use std::path::Path;
use std::process::Command;

const PDFTOTEXT: &str = "pdftotext";

/// Text of every page, in page order.
pub fn extract(path: &Path) -> Result<String, ExtractionError> {
    let tool = which::which(PDFTOTEXT).map_err(|_| ExtractionError::MissingTool(PDFTOTEXT))?;
    debug!("Running {} on {}", tool.display(), path.display());

    // "-" writes the text to stdout
    let output = Command::new(&tool)
        .args(["-enc", "UTF-8"])
        .arg(path)
        .arg("-")
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::ToolFailed {
            tool: PDFTOTEXT,
            message: if stderr.trim().is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            },
        });
    }

    // Pages are separated by form feeds
    Ok(String::from_utf8_lossy(&output.stdout).replace('\u{c}', "\n"))
}
