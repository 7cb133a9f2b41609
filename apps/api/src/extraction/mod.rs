//! Text Extractor — turns an uploaded document into plain text.
//!
//! PDFs are decoded page by page with `pdf-extract` and the page texts are
//! concatenated in page order. Plain-text and markdown uploads are decoded as
//! UTF-8. A document that cannot be decoded is an error; an empty page is not.

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to decode '{filename}': {reason}")]
    Decode { filename: String, reason: String },

    #[error("'{filename}' is not valid UTF-8 text")]
    InvalidUtf8 { filename: String },

    #[error("'{filename}' is empty")]
    Empty { filename: String },
}

/// Document kind, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Unknown or missing extensions are treated as PDF, which is what the
    /// upload form asks for.
    pub fn from_filename(filename: &str) -> Self {
        let ext = Path::new(base_name(filename))
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("txt" | "md" | "markdown") => DocumentKind::PlainText,
            _ => DocumentKind::Pdf,
        }
    }
}

/// An uploaded document. Owned by the request and dropped once its text has
/// been extracted.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_filename(&self.filename)
    }

    /// Candidate name: the stem of the upload's base file name.
    /// `"uploads/alice.pdf"` → `"alice"`. Collisions are not checked.
    pub fn candidate_name(&self) -> String {
        let base = base_name(&self.filename);
        Path::new(base)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("unnamed")
            .to_string()
    }
}

/// Strips any client-side directory components. Browsers on Windows may send
/// backslash-separated paths.
fn base_name(filename: &str) -> &str {
    filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename)
}

/// Extracts the page-ordered text of a document.
///
/// PDF decoding is CPU-bound, so it runs on the blocking pool. A panic inside
/// the decoder is reported as a decode error rather than taking the request down.
pub async fn extract_text(document: &Document) -> Result<String, ExtractionError> {
    if document.bytes.is_empty() {
        return Err(ExtractionError::Empty {
            filename: document.filename.clone(),
        });
    }

    match document.kind() {
        DocumentKind::PlainText => decode_plain_text(document),
        DocumentKind::Pdf => {
            let bytes = document.bytes.clone();
            let pages = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem_by_pages(&bytes)
            })
            .await
            .map_err(|e| ExtractionError::Decode {
                filename: document.filename.clone(),
                reason: format!("PDF decoder aborted: {e}"),
            })?
            .map_err(|e| ExtractionError::Decode {
                filename: document.filename.clone(),
                reason: e.to_string(),
            })?;

            debug!(
                "Extracted {} page(s) from '{}'",
                pages.len(),
                document.filename
            );
            Ok(pages.concat())
        }
    }
}

fn decode_plain_text(document: &Document) -> Result<String, ExtractionError> {
    std::str::from_utf8(&document.bytes)
        .map(str::to_string)
        .map_err(|_| ExtractionError::InvalidUtf8 {
            filename: document.filename.clone(),
        })
}
