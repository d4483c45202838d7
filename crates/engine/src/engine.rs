use indexmap::IndexMap;

use crate::cluster::cluster_records;
use crate::config::EngineConfig;
use crate::error::ReconError;
use crate::golden::{synthesize, GoldenRecord};
use crate::mismatch::detect_mismatches;
use crate::normalize::normalize;
use crate::record::{NormalizedRecord, RunInput};
use crate::report::{DuplicateRow, MismatchRow, RunMeta, RunReport, RunSummary};
use crate::similarity::EditDistance;

/// Run reconciliation per config over pre-loaded records.
///
/// Sources are processed in config order; a configured source with no loaded
/// rows is fatal. Everything downstream of ingestion is pure and total.
pub fn run(config: &EngineConfig, input: &RunInput) -> Result<RunReport, ReconError> {
    let mut normalized: Vec<NormalizedRecord> = Vec::new();
    let mut source_counts: IndexMap<String, usize> = IndexMap::new();

    for source in &config.sources {
        let rows = input
            .records
            .get(&source.name)
            .ok_or_else(|| ReconError::MissingSource(source.name.clone()))?;
        source_counts.insert(source.name.clone(), rows.len());
        for (i, raw) in rows.iter().enumerate() {
            normalized.push(normalize(
                raw,
                &source.name,
                i + 1,
                &config.field_aliases,
                &source.field_map,
            ));
        }
    }

    let groups = cluster_records(&normalized, config.similarity_threshold, &EditDistance);

    let mut duplicates: Vec<DuplicateRow> = Vec::new();
    let mut mismatches: Vec<MismatchRow> = Vec::new();
    let mut unified: Vec<GoldenRecord> = Vec::new();

    for (idx, (entity_key, members)) in groups.iter().enumerate() {
        let group_id = format!("G{:05}", idx + 1);

        let mismatch = detect_mismatches(members, &config.critical_columns);
        if !mismatch.is_empty() {
            let mut fields: Vec<&str> = mismatch.keys().map(String::as_str).collect();
            fields.sort_unstable();
            mismatches.push(MismatchRow {
                group_id: group_id.clone(),
                entity_key: entity_key.clone(),
                record_count: members.len(),
                mismatch_fields: fields.join(", "),
                details: serde_json::to_string(&mismatch).unwrap_or_default(),
            });
        }

        if members.len() > 1 {
            for member in members {
                duplicates.push(DuplicateRow {
                    group_id: group_id.clone(),
                    entity_key: entity_key.clone(),
                    source_name: member.source_name.clone(),
                    source_row: member.source_row,
                    name: member.get("name").to_string(),
                    email: member.get("email").to_string(),
                    phone: member.get("phone").to_string(),
                    status: member.get("status").to_string(),
                });
            }
        }

        unified.push(synthesize(
            &group_id,
            members,
            &mismatch,
            &config.source_priority,
            &config.id_columns,
            &config.critical_columns,
        ));
    }

    let summary = RunSummary {
        total_records_ingested: normalized.len(),
        source_counts,
        entity_groups: groups.len(),
        duplicate_groups: groups.values().filter(|m| m.len() > 1).count(),
        duplicate_records: duplicates.len(),
        mismatch_groups: mismatches.len(),
        output_records: unified.len(),
    };

    Ok(RunReport {
        meta: RunMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        normalized,
        duplicates,
        mismatches,
        unified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;

    fn raw(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config() -> EngineConfig {
        EngineConfig::from_toml(
            r#"
name = "Engine Test"
output_dir = "out"
source_priority = ["crm", "billing"]
id_columns = ["customer_id", "email", "phone"]
critical_columns = ["email", "phone", "status"]

[[sources]]
name = "crm"
type = "csv"
path = "crm.csv"

[[sources]]
name = "billing"
type = "csv"
path = "billing.csv"
"#,
        )
        .unwrap()
    }

    #[test]
    fn missing_source_is_fatal() {
        let config = config();
        let mut input = RunInput::default();
        input.records.insert("crm".to_string(), vec![]);

        let err = run(&config, &input).unwrap_err();
        assert!(matches!(err, ReconError::MissingSource(ref name) if name == "billing"));
    }

    #[test]
    fn empty_sources_produce_empty_report() {
        let config = config();
        let mut input = RunInput::default();
        input.records.insert("crm".to_string(), vec![]);
        input.records.insert("billing".to_string(), vec![]);

        let report = run(&config, &input).unwrap();
        assert_eq!(report.summary.total_records_ingested, 0);
        assert_eq!(report.summary.entity_groups, 0);
        assert_eq!(report.summary.duplicate_groups, 0);
        assert_eq!(report.summary.mismatch_groups, 0);
        assert!(report.unified.is_empty());
    }

    #[test]
    fn group_ids_are_sequential() {
        let config = config();
        let mut input = RunInput::default();
        input.records.insert(
            "crm".to_string(),
            vec![
                raw(&[("customer_id", "C1"), ("name", "Jane Doe")]),
                raw(&[("customer_id", "C2"), ("name", "Maria Cruz")]),
            ],
        );
        input.records.insert(
            "billing".to_string(),
            vec![raw(&[("customer_id", "C3"), ("name", "Omar Khan")])],
        );

        let report = run(&config, &input).unwrap();
        let ids: Vec<&str> = report.unified.iter().map(|g| g.group_id.as_str()).collect();
        assert_eq!(ids, vec!["G00001", "G00002", "G00003"]);
        assert_eq!(report.summary.source_counts["crm"], 2);
        assert_eq!(report.summary.source_counts["billing"], 1);
    }
}
