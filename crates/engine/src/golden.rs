use indexmap::IndexMap;
use serde::Serialize;

use crate::config::priority_index;
use crate::mismatch::MismatchReport;
use crate::normalize::completeness_score;
use crate::record::NormalizedRecord;

// ---------------------------------------------------------------------------
// Golden record
// ---------------------------------------------------------------------------

/// The single merged record representing one cluster.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenRecord {
    pub group_id: String,
    /// Source of the member chosen as primary representative.
    pub golden_source: String,
    pub has_mismatch: bool,
    /// Disagreeing critical fields, sorted.
    pub mismatch_fields: Vec<String>,
    /// Selected value for every field present in any member, sorted by
    /// field name.
    pub fields: IndexMap<String, String>,
}

impl GoldenRecord {
    /// Flat row for tabular output; booleans render as yes/no and mismatch
    /// fields comma-join.
    pub fn to_row(&self) -> IndexMap<String, String> {
        let mut row = self.fields.clone();
        row.insert("group_id".to_string(), self.group_id.clone());
        row.insert("golden_source".to_string(), self.golden_source.clone());
        row.insert(
            "has_mismatch".to_string(),
            if self.has_mismatch { "yes" } else { "no" }.to_string(),
        );
        row.insert("mismatch_fields".to_string(), self.mismatch_fields.join(", "));
        row
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Merge a cluster's members into one golden record.
///
/// The primary representative maximizes (completeness over critical ∪ id
/// columns, earlier source priority, lexicographically greatest
/// `updated_at`); the first maximal member wins ties. Each field then takes
/// the first non-empty value over members ordered by source priority with
/// members holding a value for that field first.
pub fn synthesize(
    group_id: &str,
    members: &[NormalizedRecord],
    mismatch: &MismatchReport,
    source_priority: &[String],
    id_columns: &[String],
    critical_columns: &[String],
) -> GoldenRecord {
    let mut field_names: Vec<&str> = members
        .iter()
        .flat_map(|m| m.fields.keys().map(String::as_str))
        .collect();
    field_names.sort_unstable();
    field_names.dedup();

    let score_fields: Vec<String> = critical_columns
        .iter()
        .chain(id_columns.iter())
        .cloned()
        .collect();
    let best = pick_best(members, &score_fields, source_priority);

    let mut fields = IndexMap::new();
    for field in field_names {
        let mut ordered: Vec<&NormalizedRecord> = members.iter().collect();
        ordered.sort_by_key(|m| {
            (
                priority_index(source_priority, &m.source_name),
                !m.has(field),
            )
        });
        let value = ordered
            .iter()
            .map(|m| m.get(field))
            .find(|v| !v.is_empty())
            .unwrap_or("");
        fields.insert(field.to_string(), value.to_string());
    }

    let mut mismatch_fields: Vec<String> = mismatch.keys().cloned().collect();
    mismatch_fields.sort_unstable();

    GoldenRecord {
        group_id: group_id.to_string(),
        golden_source: best.source_name.clone(),
        has_mismatch: !mismatch.is_empty(),
        mismatch_fields,
        fields,
    }
}

/// First member maximizing (completeness, priority, updated_at).
fn pick_best<'a>(
    members: &'a [NormalizedRecord],
    score_fields: &[String],
    source_priority: &[String],
) -> &'a NormalizedRecord {
    let key = |m: &'a NormalizedRecord| {
        (
            completeness_score(m, score_fields),
            -(priority_index(source_priority, &m.source_name) as i64),
            m.get("updated_at"),
        )
    };
    let mut best = &members[0];
    let mut best_key = key(best);
    for member in &members[1..] {
        let candidate = key(member);
        if candidate > best_key {
            best = member;
            best_key = candidate;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
