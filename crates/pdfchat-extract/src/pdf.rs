//! PDF page extractor.
//!
//! Uses lopdf to walk the page tree and decode the text of each page.

use async_trait::async_trait;
use lopdf::Document;
use pdfchat_core::{DocumentExtractor, ExtractError, PageBlock};
use tracing::{debug, warn};

/// Extractor for PDF documents.
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract(&self, data: &[u8]) -> Result<Vec<PageBlock>, ExtractError> {
        debug!("Extracting PDF ({} bytes)", data.len());

        // Parsing is blocking
        let bytes = data.to_vec();
        let blocks = tokio::task::spawn_blocking(move || extract_pages(&bytes))
            .await
            .map_err(|e| ExtractError::Failed(format!("Task join error: {e}")))??;

        debug!("Extracted {} pages", blocks.len());
        Ok(blocks)
    }
}

/// Extract one block per page from PDF bytes.
///
/// A page whose text cannot be decoded becomes an empty block.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<PageBlock>, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Parse(e.to_string()))?;

    // Keys are 1-based page numbers in document order
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(ExtractError::NoPages);
    }

    let mut blocks = Vec::with_capacity(pages.len());
    for &page_number in pages.keys() {
        let text = match doc.extract_text(&[page_number]) {
            Ok(raw) => normalize_page_text(&raw),
            Err(e) => {
                warn!("Failed to extract text from page {}: {}", page_number, e);
                String::new()
            }
        };
        blocks.push(PageBlock::new(page_number, text));
    }

    Ok(blocks)
}

/// Trim each line's trailing whitespace and the page's surrounding blank space.
fn normalize_page_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
