//! Document text extraction.

use std::path::Path;

use crate::sanitize;

use super::error::AnalysisError;

pub trait TextExtractor: Send + Sync {
    /// Returns the document's text. Documents that cannot be parsed or that
    /// contain no text are errors, never an empty string.
    fn extract(&self, path: &Path) -> Result<String, AnalysisError>;
}

/// Routes by extension: `pdf` through lopdf, `txt`/`md` as UTF-8.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(&self, path: &Path) -> Result<String, AnalysisError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let text = match extension.as_str() {
            "pdf" => extract_pdf(path)?,
            "txt" | "md" => extract_plain(path)?,
            other => {
                return Err(unreadable(
                    path,
                    format!("unsupported document type '{}'", other),
                ))
            }
        };

        if text.trim().is_empty() {
            return Err(unreadable(path, "no extractable text"));
        }
        Ok(text)
    }
}

fn unreadable(path: &Path, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::UnreadableDocument {
        file: sanitize::redact_path(path),
        reason: reason.into(),
    }
}

fn extract_pdf(path: &Path) -> Result<String, AnalysisError> {
    let _span = tracing::info_span!("extract.pdf").entered();

    let bytes = std::fs::read(path).map_err(|e| unreadable(path, e.to_string()))?;
    let doc = lopdf::Document::load_mem(&bytes)
        .map_err(|e| unreadable(path, format!("failed to load PDF: {}", e)))?;

    let mut text = String::new();
    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                let cleaned = collapse_whitespace(&page_text);
                if !cleaned.is_empty() {
                    text.push_str(&cleaned);
                    text.push('\n');
                }
            }
            Err(e) => tracing::debug!(page = page_num, error = %e, "Skipping unreadable page"),
        }
    }

    Ok(text)
}

fn extract_plain(path: &Path) -> Result<String, AnalysisError> {
    let _span = tracing::info_span!("extract.text").entered();

    let bytes = std::fs::read(path).map_err(|e| unreadable(path, e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| unreadable(path, "file is not valid UTF-8"))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
