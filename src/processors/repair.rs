//! Reply repair and field normalization
//!
//! Hosted text models routinely wrap valid JSON in explanatory prose or
//! markdown fences. [`extract_object`] tries a strict parse of the
//! whole reply, then falls back to the substring between the first `{`
//! and the last `}`. [`normalize`] turns the extracted mapping into a
//! [`StructuredResult`], failing only when a required field is absent.

use serde_json::{Map, Value};

use super::traits::{ProcessorError, ProcessorResult};
use crate::record::{Sentiment, StructuredResult};

/// Extract a single JSON object from arbitrary reply text.
///
/// Pure function over the text; fails with
/// [`ProcessorError::MalformedResponse`] carrying the original reply
/// when no object can be located.
pub fn extract_object(raw: &str) -> ProcessorResult<Map<String, Value>> {
    let trimmed = raw.trim();

    if let Ok(Value::Object(fields)) = serde_json::from_str(trimmed) {
        return Ok(fields);
    }

    // Boundary-character scan: `{` and `}` are ASCII, so byte indices
    // from find/rfind are valid slice offsets.
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(Value::Object(fields)) = serde_json::from_str(&trimmed[start..=end]) {
                return Ok(fields);
            }
        }
    }

    Err(ProcessorError::MalformedResponse {
        raw: raw.to_string(),
    })
}

/// Normalize a repaired mapping into a [`StructuredResult`].
///
/// Presence of the four required fields is the only hard requirement.
/// Field values themselves are repaired leniently, so an unknown
/// sentiment reads as neutral and a scalar topic becomes a one-element
/// list.
pub fn normalize(mut fields: Map<String, Value>) -> ProcessorResult<StructuredResult> {
    let sentiment = match take_field(&mut fields, "sentiment")? {
        Value::String(label) => Sentiment::parse_lenient(&label),
        _ => Sentiment::Neutral,
    };

    let key_topics = match take_field(&mut fields, "key_topics")? {
        Value::Array(items) => items.iter().map(value_to_text).collect(),
        scalar => vec![value_to_text(&scalar)],
    };

    let summary = value_to_text(&take_field(&mut fields, "summary")?);

    let confidence = coerce_confidence(&take_field(&mut fields, "confidence_score")?);

    Ok(StructuredResult::new(sentiment, key_topics, summary, confidence))
}

fn take_field(fields: &mut Map<String, Value>, field: &'static str) -> ProcessorResult<Value> {
    fields
        .remove(field)
        .ok_or(ProcessorError::MissingField { field })
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn coerce_confidence(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
