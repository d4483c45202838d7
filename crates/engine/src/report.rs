use indexmap::IndexMap;
use serde::Serialize;

use crate::golden::GoldenRecord;
use crate::record::NormalizedRecord;

// ---------------------------------------------------------------------------
// Meta + Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_records_ingested: usize,
    /// Per-source ingested counts, in config order.
    pub source_counts: IndexMap<String, usize>,
    pub entity_groups: usize,
    /// Clusters with more than one member.
    pub duplicate_groups: usize,
    /// Total members across duplicate clusters.
    pub duplicate_records: usize,
    pub mismatch_groups: usize,
    pub output_records: usize,
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One row per member of every multi-member cluster.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateRow {
    pub group_id: String,
    pub entity_key: String,
    pub source_name: String,
    pub source_row: usize,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: String,
}

impl DuplicateRow {
    pub fn to_row(&self) -> IndexMap<String, String> {
        IndexMap::from([
            ("group_id".to_string(), self.group_id.clone()),
            ("entity_key".to_string(), self.entity_key.clone()),
            ("source_name".to_string(), self.source_name.clone()),
            ("source_row".to_string(), self.source_row.to_string()),
            ("name".to_string(), self.name.clone()),
            ("email".to_string(), self.email.clone()),
            ("phone".to_string(), self.phone.clone()),
            ("status".to_string(), self.status.clone()),
        ])
    }
}

/// One row per cluster whose critical fields disagree.
#[derive(Debug, Clone, Serialize)]
pub struct MismatchRow {
    pub group_id: String,
    pub entity_key: String,
    pub record_count: usize,
    /// Disagreeing fields, sorted and comma-joined.
    pub mismatch_fields: String,
    /// JSON text of field → observed distinct values.
    pub details: String,
}

impl MismatchRow {
    pub fn to_row(&self) -> IndexMap<String, String> {
        IndexMap::from([
            ("group_id".to_string(), self.group_id.clone()),
            ("entity_key".to_string(), self.entity_key.clone()),
            ("record_count".to_string(), self.record_count.to_string()),
            ("mismatch_fields".to_string(), self.mismatch_fields.clone()),
            ("details".to_string(), self.details.clone()),
        ])
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything a run produces. Serialization to files is the reporting
/// sink's concern, not the engine's.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub normalized: Vec<NormalizedRecord>,
    pub duplicates: Vec<DuplicateRow>,
    pub mismatches: Vec<MismatchRow>,
    pub unified: Vec<GoldenRecord>,
}
