//! API payload reader: a JSON array, a `{"data": [...]}` wrapper, or JSONL,
//! from a local file or an HTTP(S) endpoint.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use unirec_engine::record::RawRecord;

use crate::SourceError;

const FETCH_TIMEOUT_SECS: u64 = 20;

pub fn read_api(path_or_url: &str, base_dir: &Path) -> Result<Vec<RawRecord>, SourceError> {
    if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
        return fetch_url(path_or_url);
    }

    let path = base_dir.join(path_or_url);
    let text = std::fs::read_to_string(&path).map_err(|e| SourceError::io(&path, e))?;

    if path_or_url.to_lowercase().ends_with(".jsonl") {
        let mut rows = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value =
                serde_json::from_str(line).map_err(|e| SourceError::parse(&path, e))?;
            rows.push(object_to_record(value)?);
        }
        return Ok(rows);
    }

    let payload: Value = serde_json::from_str(&text).map_err(|e| SourceError::parse(&path, e))?;
    payload_records(payload)
}

fn fetch_url(url: &str) -> Result<Vec<RawRecord>, SourceError> {
    let http_err = |e: &dyn std::fmt::Display| SourceError::Http {
        url: url.to_string(),
        message: e.to_string(),
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| http_err(&e))?;

    let payload: Value = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.json())
        .map_err(|e| http_err(&e))?;

    payload_records(payload)
}

fn payload_records(payload: Value) -> Result<Vec<RawRecord>, SourceError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(SourceError::Payload(
                    "API payload must be an array or {\"data\": [...]}".into(),
                ))
            }
        },
        _ => {
            return Err(SourceError::Payload(
                "API payload must be an array or {\"data\": [...]}".into(),
            ))
        }
    };
    items.into_iter().map(object_to_record).collect()
}

fn object_to_record(value: Value) -> Result<RawRecord, SourceError> {
    let Value::Object(map) = value else {
        return Err(SourceError::Payload("API record must be a JSON object".into()));
    };
    let mut raw = RawRecord::new();
    for (key, value) in map {
        raw.fields.insert(key, scalar_to_string(value));
    }
    Ok(raw)
}

/// Scalars stringify; null is absent; nested structures are carried as
/// their JSON text for pass-through fields.
fn scalar_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(name), content).unwrap();
        (dir, name.to_string())
    }

    #[test]
    fn json_array_payload() {
        let (dir, name) = write_temp(
            "api.json",
            r#"[{"id": 1, "name": "Jane", "active": true, "score": null}]"#,
        );
        let rows = read_api(&name, dir.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields["id"], "1");
        assert_eq!(rows[0].fields["name"], "Jane");
        assert_eq!(rows[0].fields["active"], "true");
        assert_eq!(rows[0].fields["score"], "");
    }

    #[test]
    fn data_wrapper_payload() {
        let (dir, name) = write_temp("api.json", r#"{"data": [{"id": "a"}, {"id": "b"}]}"#);
        let rows = read_api(&name, dir.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].fields["id"], "b");
    }

    #[test]
    fn jsonl_payload_skips_blank_lines() {
        let (dir, name) = write_temp("api.jsonl", "{\"id\": 1}\n\n{\"id\": 2}\n");
        let rows = read_api(&name, dir.path()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn field_order_is_preserved() {
        let (dir, name) = write_temp("api.json", r#"[{"zeta": "1", "alpha": "2", "mid": "3"}]"#);
        let rows = read_api(&name, dir.path()).unwrap();
        let keys: Vec<&str> = rows[0].fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn unsupported_shape_is_rejected() {
        let (dir, name) = write_temp("api.json", r#"{"rows": []}"#);
        let err = read_api(&name, dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::Payload(_)));

        let (dir, name) = write_temp("api.json", r#""just a string""#);
        let err = read_api(&name, dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::Payload(_)));
    }

    #[test]
    fn nested_values_carried_as_json_text() {
        let (dir, name) = write_temp("api.json", r#"[{"id": 1, "tags": ["a", "b"]}]"#);
        let rows = read_api(&name, dir.path()).unwrap();
        assert_eq!(rows[0].fields["tags"], r#"["a","b"]"#);
    }
}
