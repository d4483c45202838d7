use indexmap::IndexMap;

use crate::record::NormalizedRecord;

/// Critical-field name → distinct non-empty values across a cluster, in
/// first-seen order. An empty report means no disagreement.
pub type MismatchReport = IndexMap<String, Vec<String>>;

/// Collect per-field disagreements across a cluster's members. A field is
/// reported only when at least two distinct non-empty values appear.
/// Deterministic given member order.
pub fn detect_mismatches(
    members: &[NormalizedRecord],
    critical_fields: &[String],
) -> MismatchReport {
    let mut mismatches = MismatchReport::new();
    for field in critical_fields {
        let mut values: Vec<String> = Vec::new();
        for member in members {
            let value = member.get(field);
            if !value.is_empty() && !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        }
        if values.len() > 1 {
            mismatches.insert(field.clone(), values);
        }
    }
    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(source_row: usize, pairs: &[(&str, &str)]) -> NormalizedRecord {
        let mut rec = NormalizedRecord::new("test", source_row);
        for (field, value) in pairs {
            rec.set(field, value.to_string());
        }
        rec
    }

    fn criticals(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn disagreement_reported_in_first_seen_order() {
        let members = vec![
            rec(1, &[("email", "a@x.com"), ("status", "active")]),
            rec(2, &[("email", "b@x.com"), ("status", "active")]),
            rec(3, &[("email", "a@x.com"), ("status", "inactive")]),
        ];
        let report = detect_mismatches(&members, &criticals(&["email", "status"]));
        assert_eq!(report["email"], vec!["a@x.com", "b@x.com"]);
        assert_eq!(report["status"], vec!["active", "inactive"]);
    }

    #[test]
    fn agreement_is_not_reported() {
        let members = vec![
            rec(1, &[("email", "a@x.com")]),
            rec(2, &[("email", "a@x.com")]),
        ];
        let report = detect_mismatches(&members, &criticals(&["email"]));
        assert!(report.is_empty());
    }

    #[test]
    fn empty_values_are_ignored() {
        let members = vec![
            rec(1, &[("phone", "5551234567")]),
            rec(2, &[("phone", "")]),
            rec(3, &[]),
        ];
        let report = detect_mismatches(&members, &criticals(&["phone"]));
        assert!(report.is_empty(), "one distinct value is agreement");
    }

    #[test]
    fn singleton_cluster_never_mismatches() {
        let members = vec![rec(1, &[("email", "a@x.com"), ("status", "active")])];
        let report = detect_mismatches(&members, &criticals(&["email", "status"]));
        assert!(report.is_empty());
    }

    #[test]
    fn identical_extra_member_adds_no_mismatch() {
        let base = vec![
            rec(1, &[("email", "a@x.com")]),
            rec(2, &[("email", "b@x.com")]),
        ];
        let report_before = detect_mismatches(&base, &criticals(&["email", "status"]));

        let mut grown = base.clone();
        grown.push(rec(3, &[("email", "a@x.com")]));
        let report_after = detect_mismatches(&grown, &criticals(&["email", "status"]));

        assert_eq!(report_before, report_after);
    }

    #[test]
    fn uncritical_fields_are_ignored() {
        let members = vec![
            rec(1, &[("notes", "one"), ("email", "a@x.com")]),
            rec(2, &[("notes", "two"), ("email", "a@x.com")]),
        ];
        let report = detect_mismatches(&members, &criticals(&["email"]));
        assert!(report.is_empty());
    }
}
