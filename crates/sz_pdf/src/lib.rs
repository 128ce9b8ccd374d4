//! PDF text-layer access through `lopdf`.
//!
//! Only the embedded text layer is read; scanned pages without one yield no fragments.

use async_trait::async_trait;
use lopdf::Document;
use sz_extract::{DocumentParser, ParsedDocument, ServiceError, TextFragment};
use tracing::debug;

/// [`DocumentParser`] backed by `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfParser;

impl LopdfParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse `bytes` without going through the trait object.
    pub fn load(&self, bytes: &[u8]) -> Result<LopdfDocument, ServiceError> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| ServiceError::InvalidInput(format!("not a readable PDF: {e}")))?;

        // BTreeMap keys: page numbers in document order.
        let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();
        debug!(pages = page_numbers.len(), version = %doc.version, "PDF loaded");

        Ok(LopdfDocument { doc, page_numbers })
    }
}

#[async_trait]
impl DocumentParser for LopdfParser {
    async fn open(&self, bytes: &[u8]) -> Result<Box<dyn ParsedDocument>, ServiceError> {
        Ok(Box::new(self.load(bytes)?))
    }
}

/// An opened PDF.
pub struct LopdfDocument {
    doc: Document,
    page_numbers: Vec<u32>,
}

impl LopdfDocument {
    /// Text of `page` (1-based), split into trimmed non-empty lines.
    pub fn page_lines(&self, page: u32) -> Result<Vec<String>, ServiceError> {
        let number = page
            .checked_sub(1)
            .and_then(|index| self.page_numbers.get(index as usize))
            .copied()
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!(
                    "page {page} out of range (1..={})",
                    self.page_numbers.len()
                ))
            })?;

        let text = self
            .doc
            .extract_text(&[number])
            .map_err(|e| ServiceError::Failed(format!("text layer of page {page}: {e}")))?;

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[async_trait]
impl ParsedDocument for LopdfDocument {
    fn page_count(&self) -> u32 {
        self.page_numbers.len() as u32
    }

    async fn page_fragments(&self, page: u32) -> Result<Vec<TextFragment>, ServiceError> {
        Ok(self
            .page_lines(page)?
            .into_iter()
            .map(TextFragment::new)
            .collect())
    }
}
