use crate::chunking::{chunk_page, normalize_whitespace, ChunkerConfig};
use crate::error::{ExtractionError, IngestError};
use crate::extractor::extract_page_texts;
use crate::filter::DocumentFilter;
use crate::models::{PageUnit, Passage};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::debug;

pub fn digest_file(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path).map_err(ExtractionError::from)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn digest_pages(pages: &[PageUnit]) -> String {
    let mut hasher = Sha256::new();
    for page in pages {
        hasher.update(page.text.as_bytes());
        hasher.update(page.page_number.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Front half of the upload path: extract, normalize, filter, chunk.
pub fn build_passages(path: &Path, config: &ChunkerConfig) -> Result<Vec<Passage>, IngestError> {
    let pages = extract_page_texts(path)?;
    prepare_pages(pages, config)
}

/// Same pipeline from normalization onward, for pages that are already
/// extracted.
pub fn prepare_pages(
    pages: Vec<PageUnit>,
    config: &ChunkerConfig,
) -> Result<Vec<Passage>, IngestError> {
    let filter = DocumentFilter::new()?;

    let normalized: Vec<PageUnit> = pages
        .into_iter()
        .map(|page| PageUnit {
            text: normalize_whitespace(&page.text),
            ..page
        })
        .collect();

    let kept = filter.retain(normalized);

    let mut passages = Vec::new();
    for page in &kept {
        passages.extend(chunk_page(page, config));
    }

    debug!(
        pages = kept.len(),
        passages = passages.len(),
        "prepared passages"
    );
    Ok(passages)
}
