//! Record and parse-outcome types for extraction

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One candidate structured record extracted from a window
///
/// The record's field shape is defined by the resource-type descriptor that
/// produced it; this type does not validate field semantics. Citation
/// offsets, when present, are byte offsets into the original document and
/// always fall within the originating window's range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Resource type this record belongs to
    pub resource_type: String,

    /// Field name to value mapping
    pub record: Map<String, Value>,

    /// Verbatim source span supporting the extraction, if the model
    /// provided one
    pub citation: Option<String>,

    /// Start of the citation span in the original document
    pub start_pos: Option<usize>,

    /// End of the citation span in the original document (exclusive)
    pub end_pos: Option<usize>,
}

impl ExtractedRecord {
    /// The citation span as a half-open range, when both offsets are
    /// present and non-empty.
    pub fn span(&self) -> Option<(usize, usize)> {
        match (self.start_pos, self.end_pos) {
            (Some(start), Some(end)) if start < end => Some((start, end)),
            _ => None,
        }
    }

    /// Whether this record carries a citation span (grounded extraction).
    pub fn is_grounded(&self) -> bool {
        self.citation.is_some()
    }
}

/// Outcome of parsing one window's LLM response
///
/// Malformed output is a tagged value, never an error: a bad response
/// contributes zero records and a metrics increment, nothing more.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    /// Response parsed; zero or more usable records
    Parsed(Vec<ExtractedRecord>),

    /// Response was not usable JSON; reason recorded for logging
    Malformed(String),
}
