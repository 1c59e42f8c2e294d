//! Parsing, citation mapping, and deduplication of LLM output
//!
//! LLM responses are treated as untrusted input: anything that is not
//! usable JSON becomes a `ParseOutcome::Malformed` value, never an error.
//! Well-formed items have their citation spans translated from
//! window-relative to document coordinates and clamped to the window's
//! range before records are merged across windows.

use crate::types::{ExtractedRecord, ParseOutcome};
use crate::window::ExtractionWindow;
use serde_json::{Map, Value};
use tracing::warn;

/// Parse one window's raw LLM response into records for one resource type.
///
/// Tolerated variations: markdown code fences around the JSON, a bare
/// object instead of a one-element array, and flat objects whose fields
/// sit beside `citation`/`start_pos`/`end_pos` instead of under a `record`
/// key. Items that still yield no fields are skipped with a warning.
pub fn parse_window_response(
    raw: &str,
    window: &ExtractionWindow,
    resource_type: &str,
) -> ParseOutcome {
    let json_str = strip_code_fences(raw);

    let json: Value = match serde_json::from_str(&json_str) {
        Ok(value) => value,
        Err(e) => return ParseOutcome::Malformed(format!("JSON parse error: {}", e)),
    };

    let items: Vec<Value> = match json {
        Value::Array(items) => items,
        Value::Object(_) => vec![json],
        other => {
            return ParseOutcome::Malformed(format!(
                "expected JSON array or object, got {}",
                json_type_name(&other)
            ))
        }
    };

    let mut records = Vec::new();
    for (idx, item) in items.into_iter().enumerate() {
        match parse_candidate(item, window, resource_type) {
            Some(record) => records.push(record),
            None => warn!(resource_type, idx, "skipping unusable candidate"),
        }
    }
    ParseOutcome::Parsed(records)
}

/// Extract the JSON payload from a response that may be wrapped in a
/// markdown code fence.
fn strip_code_fences(response: &str) -> String {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        return trimmed.to_string();
    }
    // Drop the opening fence line (``` or ```json) and a trailing fence
    let body = &lines[1..];
    let body = if body.last().map_or(false, |l| l.trim_start().starts_with("```")) {
        &body[..body.len() - 1]
    } else {
        body
    };
    body.join("\n")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse one candidate object into an `ExtractedRecord`.
fn parse_candidate(
    item: Value,
    window: &ExtractionWindow,
    resource_type: &str,
) -> Option<ExtractedRecord> {
    let mut obj = match item {
        Value::Object(obj) => obj,
        _ => return None,
    };

    let citation = obj
        .get("citation")
        .and_then(Value::as_str)
        .map(str::to_string);
    // Offsets come straight from the model; anything that does not fit a
    // usize is treated the same as an absent offset
    let start_raw = obj
        .get("start_pos")
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok());
    let end_raw = obj
        .get("end_pos")
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok());

    let fields: Map<String, Value> = match obj.remove("record") {
        Some(Value::Object(record)) => record,
        Some(_) => return None,
        None => {
            // Flat variation: the object itself is the record, minus the
            // metadata keys
            for key in ["citation", "start_pos", "end_pos", "resource_type"] {
                obj.remove(key);
            }
            obj
        }
    };

    if fields.is_empty() {
        return None;
    }

    let (start_pos, end_pos) = map_citation_span(citation.as_deref(), start_raw, end_raw, window);

    Some(ExtractedRecord {
        resource_type: resource_type.to_string(),
        record: fields,
        citation,
        start_pos,
        end_pos,
    })
}

/// Translate a window-relative citation span to document coordinates.
///
/// Offsets are clamped to the window's range; a span that clamps to
/// nothing is dropped (the citation text is kept). When the model gave a
/// citation without offsets, the span is recovered by substring search
/// within the window.
fn map_citation_span(
    citation: Option<&str>,
    start: Option<usize>,
    end: Option<usize>,
    window: &ExtractionWindow,
) -> (Option<usize>, Option<usize>) {
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            // Saturating on purpose: an absurd offset clamps to the window
            // end and falls out below, like any other out-of-range span
            let abs_start = window
                .start_offset
                .saturating_add(start)
                .min(window.end_offset);
            let abs_end = window
                .start_offset
                .saturating_add(end)
                .min(window.end_offset);
            if abs_start < abs_end {
                (Some(abs_start), Some(abs_end))
            } else {
                warn!(start, end, "citation span outside window; dropping offsets");
                (None, None)
            }
        }
        _ => match citation {
            Some(text) if !text.is_empty() => match window.text.find(text) {
                Some(found) => (
                    Some(window.start_offset + found),
                    Some(window.start_offset + found + text.len()),
                ),
                None => (None, None),
            },
            _ => (None, None),
        },
    }
}

/// Fraction of the shorter span covered by the overlap of two spans.
fn span_overlap(a: (usize, usize), b: (usize, usize)) -> f64 {
    let intersection = a.1.min(b.1).saturating_sub(a.0.max(b.0));
    if intersection == 0 {
        return 0.0;
    }
    let shorter = (a.1 - a.0).min(b.1 - b.0);
    intersection as f64 / shorter as f64
}

/// Insert a record into a per-type list unless it duplicates a kept one.
///
/// Two records are duplicates when their citation spans overlap by more
/// than `overlap_threshold` (as a fraction of the shorter span) and their
/// field values are identical, or when neither carries a span and their
/// field values and citations are identical. First-seen wins.
///
/// Returns whether the record was kept.
pub fn dedupe_insert(
    kept: &mut Vec<ExtractedRecord>,
    candidate: ExtractedRecord,
    overlap_threshold: f64,
) -> bool {
    let duplicate = kept.iter().any(|existing| {
        if existing.resource_type != candidate.resource_type
            || existing.record != candidate.record
        {
            return false;
        }
        match (existing.span(), candidate.span()) {
            (Some(a), Some(b)) => span_overlap(a, b) > overlap_threshold,
            (None, None) => existing.citation == candidate.citation,
            _ => false,
        }
    });

    if duplicate {
        return false;
    }
    kept.push(candidate);
    true
}
