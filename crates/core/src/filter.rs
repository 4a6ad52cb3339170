use crate::error::IngestError;
use crate::models::PageUnit;
use regex::Regex;
use tracing::debug;

/// Units whose stripped text is shorter than this are discarded.
pub const MIN_TEXT_CHARS: usize = 50;

/// More than this many `<pad>` or `<EOS>` markers means model-artifact
/// garbage leaked into the PDF text.
const MAX_ARTIFACT_MARKERS: usize = 3;

/// Runs of four or more digits: page-number runs, tables, OCR noise.
const DIGIT_RUN_PATTERN: &str = r"[0-9]{4,}";

/// Quality gate applied to normalized page units before chunking.
pub struct DocumentFilter {
    digit_run: Regex,
}

impl DocumentFilter {
    pub fn new() -> Result<Self, IngestError> {
        Ok(Self {
            digit_run: Regex::new(DIGIT_RUN_PATTERN)?,
        })
    }

    /// True when any discard predicate holds for the text.
    pub fn is_garbage(&self, text: &str) -> bool {
        if text.trim().chars().count() < MIN_TEXT_CHARS {
            return true;
        }
        if text.matches("<pad>").count() > MAX_ARTIFACT_MARKERS {
            return true;
        }
        if text.matches("<EOS>").count() > MAX_ARTIFACT_MARKERS {
            return true;
        }
        self.digit_run.is_match(text)
    }

    /// Keeps the surviving subsequence, order preserved. An empty result is
    /// valid and flows through the rest of the pipeline as an empty index.
    pub fn retain(&self, units: Vec<PageUnit>) -> Vec<PageUnit> {
        let before = units.len();
        let kept: Vec<PageUnit> = units
            .into_iter()
            .filter(|unit| !self.is_garbage(&unit.text))
            .collect();
        if kept.len() < before {
            debug!(dropped = before - kept.len(), kept = kept.len(), "filtered page units");
        }
        kept
    }
}
