use indexmap::IndexMap;
use serde::Serialize;

/// The fixed canonical field vocabulary. Normalization guarantees every one
/// of these keys exists on every record (possibly as the empty string).
pub const CANONICAL_FIELDS: [&str; 11] = [
    "customer_id",
    "name",
    "email",
    "phone",
    "address",
    "dob",
    "amount",
    "currency",
    "status",
    "notes",
    "updated_at",
];

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single raw row exactly as a source reader produced it: source-defined
/// field names mapped to raw values, in reader order.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub fields: IndexMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<(String, String)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Pre-loaded raw rows grouped by source name. Row order within a source
/// defines the 1-based `source_row` index.
#[derive(Debug, Default)]
pub struct RunInput {
    pub records: IndexMap<String, Vec<RawRecord>>,
}

// ---------------------------------------------------------------------------
// Normalized
// ---------------------------------------------------------------------------

/// A record mapped onto the canonical vocabulary. Unrecognized source fields
/// pass through under their lower-cased names; missing canonical fields are
/// materialized as empty strings so field access is total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub source_name: String,
    pub source_row: usize,
    #[serde(flatten)]
    pub fields: IndexMap<String, String>,
}

impl NormalizedRecord {
    pub fn new(source_name: &str, source_row: usize) -> Self {
        Self {
            source_name: source_name.to_string(),
            source_row,
            fields: IndexMap::new(),
        }
    }

    /// Total accessor: absent fields read as empty.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: &str, value: String) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    /// Flat row for tabular output: provenance columns plus every field.
    pub fn to_row(&self) -> IndexMap<String, String> {
        let mut row = IndexMap::new();
        row.insert("source_name".to_string(), self.source_name.clone());
        row.insert("source_row".to_string(), self.source_row.to_string());
        for (field, value) in &self.fields {
            row.insert(field.clone(), value.clone());
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_total() {
        let mut rec = NormalizedRecord::new("crm", 1);
        rec.set("name", "Ada".into());
        assert_eq!(rec.get("name"), "Ada");
        assert_eq!(rec.get("never_set"), "");
        assert!(rec.has("name"));
        assert!(!rec.has("never_set"));
    }

    #[test]
    fn to_row_leads_with_provenance() {
        let mut rec = NormalizedRecord::new("crm", 7);
        rec.set("name", "Ada".into());
        let row = rec.to_row();
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["source_name", "source_row", "name"]);
        assert_eq!(row["source_row"], "7");
    }
}
