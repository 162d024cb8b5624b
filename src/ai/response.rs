//! Provider response parsing and schema coercion.
//!
//! Providers answer in one of several shapes: a chat-completion envelope
//! whose message content is a JSON string, an enveloped `data` object, or
//! a bare object. Shapes are attempted in that fixed priority order; the
//! winning object is then coerced field by field into
//! [`AiCompanyRecord`], never rejected outright for a wrong-typed field.

use serde_json::Value;

use crate::ai::{AiCompanyRecord, AiError};

/// Keys a bare response object must carry to be accepted as shape 3.
const EXPECTED_KEYS: &[&str] = &[
    "name",
    "domain",
    "countries",
    "hq",
    "industry",
    "subindustries",
    "keywords",
    "size",
    "linkedin_url",
    "slug",
    "original_name",
    "legal_name",
];

/// Coerces an arbitrary JSON value into an optional string field.
/// Null, `""`, and `[]` become `None`; other scalars are stringified.
fn coerce_scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Array(items) if items.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Coerces an arbitrary JSON value into a string list. Non-list scalars
/// are wrapped; null and `""` become the empty list.
fn coerce_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => {
                    let t = s.trim();
                    (!t.is_empty()).then(|| t.to_string())
                }
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if s.trim().is_empty() => Vec::new(),
        Some(Value::String(s)) => vec![s.trim().to_string()],
        Some(other) => vec![other.to_string()],
    }
}

/// Coerces one JSON object into the fixed record schema.
pub(crate) fn coerce_record(obj: &Value) -> AiCompanyRecord {
    // The original protocol named the keyword field "keywords_cntxt";
    // accept both spellings.
    let keywords = obj
        .get("keywords_cntxt")
        .or_else(|| obj.get("keywords"));
    AiCompanyRecord {
        name: coerce_scalar(obj.get("name")),
        domain: coerce_scalar(obj.get("domain")),
        countries: coerce_list(obj.get("countries")),
        hq: coerce_scalar(obj.get("hq")),
        industry: coerce_scalar(obj.get("industry")),
        subindustries: coerce_list(obj.get("subindustries")),
        keywords: coerce_list(keywords),
        size: coerce_scalar(obj.get("size")),
        linkedin_url: coerce_scalar(obj.get("linkedin_url")),
        slug: coerce_scalar(obj.get("slug")),
        original_name: coerce_scalar(obj.get("original_name")),
        legal_name: coerce_scalar(obj.get("legal_name")),
    }
}

/// Extracts the company object from a response payload, attempting each
/// known shape in priority order.
fn extract_object(payload: &Value) -> Result<Value, AiError> {
    // Shape 1: chat-completion content carrying a JSON string.
    if let Some(content) = payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
    {
        if let Ok(parsed) = serde_json::from_str::<Value>(content) {
            if parsed.is_object() {
                return Ok(parsed);
            }
        }
    }

    // Shape 2: enveloped data object.
    if let Some(data) = payload.get("data") {
        if data.is_object() {
            return Ok(data.clone());
        }
    }

    // Shape 3: a bare object carrying the full expected key set.
    if let Some(map) = payload.as_object() {
        if EXPECTED_KEYS
            .iter()
            .all(|k| map.contains_key(*k) || (*k == "keywords" && map.contains_key("keywords_cntxt")))
        {
            return Ok(payload.clone());
        }
    }

    Err(AiError::ParseFailed(
        "unable to parse provider response into the expected JSON object".to_string(),
    ))
}

/// Parses a single-company response payload.
pub fn parse_company_response(payload: &Value) -> Result<AiCompanyRecord, AiError> {
    let obj = extract_object(payload)?;
    Ok(coerce_record(&obj))
}

/// Parses a batched response envelope: `data` must be an array whose
/// length matches the request chunk.
pub fn parse_batch_response(
    payload: &Value,
    expected_len: usize,
) -> Result<Vec<AiCompanyRecord>, AiError> {
    let Some(items) = payload.get("data").and_then(Value::as_array) else {
        return Err(AiError::ParseFailed(
            "batch response is missing the data array".to_string(),
        ));
    };
    if items.len() != expected_len {
        return Err(AiError::ParseFailed(format!(
            "batch response length mismatch: expected {expected_len}, got {}",
            items.len()
        )));
    }
    items
        .iter()
        .map(|item| {
            if item.is_object() {
                Ok(coerce_record(item))
            } else {
                Err(AiError::ParseFailed(
                    "batch response item is not an object".to_string(),
                ))
            }
        })
        .collect()
}
