use crate::error::ExtractionError;
use crate::models::PageUnit;
use lopdf::Document;
use std::path::Path;

pub trait PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageUnit>, ExtractionError>;
}

/// lopdf-backed extractor. Yields one `PageUnit` per page with readable
/// text, numbered 1-based in original document order; whitespace-only
/// pages are skipped without disturbing the numbering of later pages.
#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageUnit>, ExtractionError> {
        let document =
            Document::load(path).map_err(|error| ExtractionError::Parse(error.to_string()))?;
        let source_id = path.display().to_string();

        let mut pages = Vec::new();
        for (page_number, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_number])
                .map_err(|error| ExtractionError::Parse(error.to_string()))?;

            if !text.trim().is_empty() {
                pages.push(PageUnit {
                    text,
                    page_number,
                    source_id: source_id.clone(),
                });
            }
        }

        Ok(pages)
    }
}

pub fn extract_page_texts(path: &Path) -> Result<Vec<PageUnit>, ExtractionError> {
    LopdfExtractor.extract_pages(path)
}
