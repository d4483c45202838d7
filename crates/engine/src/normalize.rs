use indexmap::IndexMap;

use crate::coerce::{
    clean_string, detect_currency, format_amount, normalize_email, normalize_phone, parse_amount,
    parse_date, title_case,
};
use crate::record::{NormalizedRecord, RawRecord, CANONICAL_FIELDS};

// ---------------------------------------------------------------------------
// Alias resolution
// ---------------------------------------------------------------------------

/// Built-in alias table: canonical field → accepted source names. Immutable;
/// run-scoped tables are layered on top of it, never merged into it.
const DEFAULT_ALIASES: [(&str, &[&str]); 11] = [
    ("customer_id", &["customer_id", "id", "cust_id", "client_id"]),
    ("name", &["name", "full_name", "customer_name"]),
    ("email", &["email", "email_address", "mail"]),
    ("phone", &["phone", "phone_number", "contact"]),
    ("address", &["address", "addr", "location"]),
    ("dob", &["dob", "date_of_birth", "birth_date"]),
    ("amount", &["amount", "balance", "total_amount", "value"]),
    ("status", &["status", "state", "record_status"]),
    ("updated_at", &["updated_at", "last_updated", "modified_at"]),
    ("currency", &["currency", "curr", "ccy"]),
    ("notes", &["notes", "memo", "description", "details"]),
];

/// Compose the three alias layers into one lookup of accepted name →
/// canonical field. Later layers win: built-ins < operator-declared global
/// aliases < per-source field map. Keys are lower-cased and trimmed.
pub fn build_alias_lookup(
    global_aliases: &IndexMap<String, Vec<String>>,
    source_field_map: &IndexMap<String, String>,
) -> IndexMap<String, String> {
    let mut lookup: IndexMap<String, String> = IndexMap::new();
    for (canonical, aliases) in DEFAULT_ALIASES {
        for alias in aliases {
            lookup.insert((*alias).to_string(), canonical.to_string());
        }
    }
    for (canonical, aliases) in global_aliases {
        let canonical = canonical.trim().to_lowercase();
        for alias in aliases {
            lookup.insert(alias.trim().to_lowercase(), canonical.clone());
        }
        // A declared canonical name always maps to itself.
        lookup.insert(canonical.clone(), canonical);
    }
    for (source_field, canonical) in source_field_map {
        lookup.insert(
            source_field.trim().to_lowercase(),
            canonical.trim().to_lowercase(),
        );
    }
    lookup
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Map a raw row onto the canonical vocabulary and coerce every canonical
/// value. Total: every canonical field exists afterwards (possibly empty),
/// unrecognized fields pass through under their lower-cased names, and no
/// value failure is fatal.
pub fn normalize(
    raw: &RawRecord,
    source_name: &str,
    row_num: usize,
    global_aliases: &IndexMap<String, Vec<String>>,
    source_field_map: &IndexMap<String, String>,
) -> NormalizedRecord {
    let lookup = build_alias_lookup(global_aliases, source_field_map);

    let mut rec = NormalizedRecord::new(source_name, row_num);
    for (key, value) in &raw.fields {
        let trimmed = key.trim().to_lowercase();
        let target = lookup.get(&trimmed).cloned().unwrap_or(trimmed);
        rec.set(&target, value.clone());
    }

    let customer_id = clean_string(rec.get("customer_id"));
    rec.set("customer_id", customer_id);

    let name = title_case(&clean_string(rec.get("name")));
    rec.set("name", name);

    let email = normalize_email(rec.get("email"));
    rec.set("email", email);

    let phone = normalize_phone(rec.get("phone"));
    rec.set("phone", phone);

    let address = title_case(&clean_string(rec.get("address")));
    rec.set("address", address);

    let dob = parse_date(rec.get("dob"));
    rec.set("dob", dob);

    let updated_at = parse_date(rec.get("updated_at"));
    rec.set("updated_at", updated_at);

    let amount_raw = rec.get("amount").to_string();
    let amount = parse_amount(&amount_raw).map(format_amount).unwrap_or_default();
    rec.set("amount", amount);

    let currency = clean_string(rec.get("currency"));
    let currency = if currency.is_empty() {
        detect_currency(&amount_raw)
    } else {
        currency
    };
    rec.set("currency", currency);

    let status = clean_string(rec.get("status")).to_lowercase();
    rec.set("status", status);

    let notes = clean_string(rec.get("notes"));
    rec.set("notes", notes);

    debug_assert!(CANONICAL_FIELDS.iter().all(|f| rec.fields.contains_key(*f)));
    rec
}

/// Count of non-empty values among the given fields.
pub fn completeness_score(record: &NormalizedRecord, fields: &[String]) -> usize {
    fields.iter().filter(|f| record.has(f)).count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
