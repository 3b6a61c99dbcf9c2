//! Best-effort parsing of capability responses.
//!
//! The capability returns raw text that is usually, but not always, JSON.
//! This module recovers the records it can and treats everything else as
//! absent. Recovery strategies, in order:
//!
//! 1. Direct `serde_json` parse
//! 2. Extract JSON from a markdown code block
//! 3. Strip trailing commas and retry
//! 4. Code block, then strip trailing commas
//! 5. Slice from the first `[`/`{` to the last `]`/`}` (prose around JSON)
//!
//! The payload may be a bare array of records or an object wrapping one
//! (`{"tweets": [...]}`); a single record object also counts.

use serde_json::Value;

use crate::error::RunnerError;

/// Keys under which a record list may be wrapped.
const WRAPPERS: [&str; 4] = ["tweets", "interactions", "replies", "records"];

/// One recovered tweet record.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    /// Request id the record answers, for interaction batches.
    pub id: Option<usize>,
    /// Handle the record claims to belong to, without the `@`.
    pub handle: Option<String>,
    /// Tweet text, trimmed and non-empty.
    pub content: String,
    /// Sentiment in `[-1, 1]`, when the record carried a usable number.
    pub sentiment: Option<f64>,
}

/// Parse a capability response into records.
///
/// Entries without usable content are dropped. Records are matched to
/// requests by `handle` or `id`, never by where they sit in the payload.
pub fn parse_records(raw: &str) -> Result<Vec<ParsedRecord>, RunnerError> {
    let value = parse_value(raw)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            match WRAPPERS.iter().find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            }) {
                Some(items) => items,
                None => vec![Value::Object(map)],
            }
        }
        other => {
            return Err(RunnerError::Parse {
                reason: format!("expected a record list, got {other}"),
            });
        }
    };
    Ok(items.iter().filter_map(record).collect())
}

fn parse_value(raw: &str) -> Result<Value, RunnerError> {
    let trimmed = raw.trim();

    // Strategy 1: direct parse
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    // Strategy 2: extract from markdown code block
    let fenced = extract_json_from_codeblock(trimmed);
    if let Some(json) = fenced
        && let Ok(value) = serde_json::from_str(json)
    {
        return Ok(value);
    }

    // Strategy 3: strip trailing commas and retry
    if let Ok(value) = serde_json::from_str(&strip_trailing_commas(trimmed)) {
        return Ok(value);
    }

    // Strategy 4: code block then strip commas
    if let Some(json) = fenced
        && let Ok(value) = serde_json::from_str(&strip_trailing_commas(json))
    {
        return Ok(value);
    }

    // Strategy 5: outermost bracketed span
    if let Some(json) = outer_json_span(trimmed)
        && let Ok(value) = serde_json::from_str(&strip_trailing_commas(json))
    {
        return Ok(value);
    }

    Err(RunnerError::Parse {
        reason: format!("all parse strategies failed for: {trimmed}"),
    })
}

/// Convert one payload entry; anything without usable content is absent.
fn record(item: &Value) -> Option<ParsedRecord> {
    let object = item.as_object()?;
    let content = ["content", "tweet", "text"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|text| !text.is_empty())?;

    let handle = ["handle", "persona", "author"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(|h| h.trim().trim_start_matches('@').to_owned())
        .filter(|h| !h.is_empty());

    let id = object.get("id").and_then(|v| match v {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    });

    let sentiment = object
        .get("sentiment")
        .and_then(|s| match s {
            Value::Number(n) => n.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
        .filter(|s: &f64| s.is_finite())
        .map(|s| s.clamp(-1.0, 1.0));

    Some(ParsedRecord {
        id,
        handle,
        content: content.to_owned(),
        sentiment,
    })
}

/// Extract a JSON block from markdown code fences.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = text.get(open.checked_add(3)?..)?;
    // Skip the info string (```json) up to the end of the line.
    let body_start = after_fence.find('\n').and_then(|nl| nl.checked_add(1)).unwrap_or(0);
    let body = after_fence.get(body_start..)?;
    let close = body.find("```")?;
    body.get(..close).map(str::trim)
}

/// The span from the first opening bracket to the last matching closer.
fn outer_json_span(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let closer = if text.get(start..)?.starts_with('[') { ']' } else { '}' };
    let end = text.rfind(closer)?;
    if end <= start {
        return None;
    }
    text.get(start..=end)
}

/// Strip trailing commas before closing braces and brackets.
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' {
            let rest: String = chars.clone().skip_while(|n| n.is_whitespace()).take(1).collect();
            if rest == "}" || rest == "]" {
                continue;
            }
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn parse_wrapped_records() {
        let raw = r#"{"tweets": [
            {"handle": "@degen_andy", "content": "$PEPEC lfg", "sentiment": 0.9},
            {"handle": "skeptic_sam", "content": "  looks like a rug  ", "sentiment": -0.7}
        ]}"#;
        let records = parse_records(raw).unwrap();
        assert_eq!(records.len(), 2);
        let first = &records[0];
        assert_eq!(first.handle.as_deref(), Some("degen_andy"));
        assert_eq!(first.content, "$PEPEC lfg");
        assert_eq!(first.id, None);
        assert_eq!(records[1].content, "looks like a rug");
    }

    #[test]
    fn parse_bare_array_in_code_block() {
        let raw = "Here you go:\n```json\n[{\"content\": \"ser this is early\", \"sentiment\": 0.4},]\n```";
        let records = parse_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].sentiment.is_some());
    }

    #[test]
    fn parse_json_surrounded_by_prose() {
        let raw = r#"Sure! [{"content": "wagmi"}] Hope that helps."#;
        let records = parse_records(raw).unwrap();
        assert_eq!(records[0].content, "wagmi");
    }

    #[test]
    fn empty_or_missing_content_is_dropped() {
        let raw = r#"[{"id": 0, "content": ""}, {"id": 1, "sentiment": 0.5}, "nope", {"id": 3, "content": "ok"}]"#;
        let records = parse_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, Some(3));
        assert_eq!(records[0].content, "ok");
    }

    #[test]
    fn ids_accept_numbers_and_numeric_strings() {
        let raw = r#"[
            {"id": 2, "content": "a"},
            {"id": " 5 ", "content": "b"},
            {"id": -1, "content": "c"},
            {"id": "first", "content": "d"}
        ]"#;
        let ids: Vec<_> = parse_records(raw).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Some(2), Some(5), None, None]);
    }

    #[test]
    fn sentiment_is_clamped_or_dropped() {
        let raw = r#"[
            {"content": "a", "sentiment": 3.5},
            {"content": "b", "sentiment": "-0.25"},
            {"content": "c", "sentiment": "very bullish"}
        ]"#;
        let records = parse_records(raw).unwrap();
        let sentiments: Vec<_> = records.iter().map(|r| r.sentiment).collect();
        assert_eq!(sentiments, vec![Some(1.0), Some(-0.25), None]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_records("the model took the day off").is_err());
        assert!(parse_records("42").is_err());
    }

    #[test]
    fn strip_trailing_commas_basic() {
        assert_eq!(strip_trailing_commas(r#"{"a": 1, "b": 2,}"#), r#"{"a": 1, "b": 2}"#);
        assert_eq!(strip_trailing_commas("[1, 2, 3,\n]"), "[1, 2, 3\n]");
    }
}
