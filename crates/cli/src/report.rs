//! Reporting sink: CSV and JSON report files under the run's output
//! directory.
//!
//! CSV columns are the sorted union of every row's field names so dynamic
//! pass-through fields always land in the output; absent values write as
//! empty cells. An empty record set produces an empty file rather than a
//! lone header.

use std::path::Path;

use indexmap::IndexMap;
use unirec_engine::RunReport;

/// Write all report files for a finished run. Returns the written file
/// names.
pub fn write_reports(out_dir: &Path, report: &RunReport) -> Result<Vec<String>, String> {
    std::fs::create_dir_all(out_dir).map_err(|e| format!("cannot create {}: {e}", out_dir.display()))?;

    let normalized: Vec<IndexMap<String, String>> =
        report.normalized.iter().map(|r| r.to_row()).collect();
    let duplicates: Vec<IndexMap<String, String>> =
        report.duplicates.iter().map(|r| r.to_row()).collect();
    let mismatches: Vec<IndexMap<String, String>> =
        report.mismatches.iter().map(|r| r.to_row()).collect();
    let unified: Vec<IndexMap<String, String>> =
        report.unified.iter().map(|r| r.to_row()).collect();

    let files = [
        ("normalized_records.csv", &normalized),
        ("duplicate_records.csv", &duplicates),
        ("mismatch_report.csv", &mismatches),
        ("unified_dataset.csv", &unified),
    ];
    let mut written = Vec::new();
    for (name, rows) in files {
        write_csv(&out_dir.join(name), rows)?;
        written.push(name.to_string());
    }

    let payload = serde_json::json!({
        "summary": report.summary,
        "mismatches": report.mismatches,
    });
    let json_path = out_dir.join("reconciliation_report.json");
    let text = serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?;
    std::fs::write(&json_path, text)
        .map_err(|e| format!("cannot write {}: {e}", json_path.display()))?;
    written.push("reconciliation_report.json".to_string());

    Ok(written)
}

fn write_csv(path: &Path, rows: &[IndexMap<String, String>]) -> Result<(), String> {
    if rows.is_empty() {
        return std::fs::write(path, "").map_err(|e| format!("cannot write {}: {e}", path.display()));
    }

    let mut headers: Vec<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    headers.sort_unstable();
    headers.dedup();

    let mut writer =
        csv::Writer::from_path(path).map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    writer.write_record(&headers).map_err(|e| e.to_string())?;
    for row in rows {
        let record: Vec<&str> = headers
            .iter()
            .map(|h| row.get(*h).map(String::as_str).unwrap_or(""))
            .collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}
