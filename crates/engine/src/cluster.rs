use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};

use indexmap::IndexMap;

use crate::record::NormalizedRecord;
use crate::similarity::Similarity;

/// Fields that carry identity signal, used to pick cluster representatives.
pub const IDENTITY_FIELDS: [&str; 5] = ["customer_id", "email", "phone", "name", "dob"];

/// Clusters keyed by entity key, in formation order. Members keep insertion
/// order.
pub type ClusterMap = IndexMap<String, Vec<NormalizedRecord>>;

// ---------------------------------------------------------------------------
// Entity keys
// ---------------------------------------------------------------------------

/// Deterministic grouping key for a record's presumed real-world entity.
///
/// Strong identifiers win in order (`customer_id`, `email`, `phone`), then
/// the name+dob pair. Records with none of these get a fallback key hashed
/// from (name, address); fallback keys are weak identity and are placed by
/// similarity, not key equality.
pub fn entity_key(record: &NormalizedRecord) -> String {
    for field in ["customer_id", "email", "phone"] {
        let value = record.get(field).trim();
        if !value.is_empty() {
            return format!("{field}:{value}");
        }
    }
    let name = record.get("name").trim().to_lowercase();
    let dob = record.get("dob").trim();
    if !name.is_empty() && !dob.is_empty() {
        return format!("name_dob:{name}:{dob}");
    }
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    record.get("address").to_lowercase().hash(&mut hasher);
    format!("fallback:{:016x}", hasher.finish())
}

pub fn is_fallback_key(key: &str) -> bool {
    key.starts_with("fallback:")
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

/// Group records by inferred identity.
///
/// Stage 1 buckets records by canonical entity key. Stage 2 places each
/// weakly-keyed record into the first cluster whose representative name is
/// similar enough (or leaves it as a singleton). Stage 3 merges clusters
/// that are themselves likely duplicates.
pub fn cluster_records(
    records: &[NormalizedRecord],
    threshold: f64,
    sim: &dyn Similarity,
) -> ClusterMap {
    let mut groups: ClusterMap = IndexMap::new();
    let mut leftovers: Vec<NormalizedRecord> = Vec::new();

    for rec in records {
        let key = entity_key(rec);
        if is_fallback_key(&key) {
            leftovers.push(rec.clone());
        } else {
            groups.entry(key).or_default().push(rec.clone());
        }
    }

    for rec in leftovers {
        let mut target: Option<usize> = None;
        for (idx, members) in groups.values().enumerate() {
            let probe = &members[0];
            let score = sim.score(rec.get("name"), probe.get("name"));
            let same_dob = rec.has("dob") && rec.get("dob") == probe.get("dob");
            if score >= threshold && (same_dob || score >= threshold + 0.05) {
                target = Some(idx);
                break;
            }
        }
        match target {
            Some(idx) => groups[idx].push(rec),
            // Unplaced records form singletons under their fallback key; a
            // key collision (same hashed name+address) joins the existing
            // cluster so no record is ever displaced.
            None => groups.entry(entity_key(&rec)).or_default().push(rec),
        }
    }

    merge_similar_groups(groups, threshold, sim)
}

// ---------------------------------------------------------------------------
// Cluster merging
// ---------------------------------------------------------------------------

/// Member with the most non-empty identity-bearing fields; the first-seen
/// member wins ties.
fn representative(members: &[NormalizedRecord]) -> &NormalizedRecord {
    let mut best = &members[0];
    let mut best_count = identity_count(best);
    for member in &members[1..] {
        let count = identity_count(member);
        if count > best_count {
            best = member;
            best_count = count;
        }
    }
    best
}

fn identity_count(record: &NormalizedRecord) -> usize {
    IDENTITY_FIELDS.iter().filter(|f| record.has(f)).count()
}

fn should_merge(
    a: &[NormalizedRecord],
    b: &[NormalizedRecord],
    threshold: f64,
    sim: &dyn Similarity,
) -> bool {
    let ra = representative(a);
    let rb = representative(b);
    let name_score = sim.score(ra.get("name"), rb.get("name"));
    let email_score = sim.score(ra.get("email"), rb.get("email"));
    let same_phone = ra.has("phone") && ra.get("phone") == rb.get("phone");
    let same_dob = ra.has("dob") && ra.get("dob") == rb.get("dob");

    if same_phone && name_score >= threshold - 0.10 {
        return true;
    }
    if same_dob && (name_score >= threshold || email_score >= threshold - 0.05) {
        return true;
    }
    name_score >= threshold + 0.05 && email_score >= threshold - 0.05
}

/// Single-pass pairwise merge. Each cluster can be consumed into at most one
/// survivor, and a consumed cluster is never revisited as a merge source, so
/// chains (A~B, B~C) are not transitively closed.
fn merge_similar_groups(groups: ClusterMap, threshold: f64, sim: &dyn Similarity) -> ClusterMap {
    let keys: Vec<String> = groups.keys().cloned().collect();
    let mut consumed: HashSet<&str> = HashSet::new();
    let mut merged: ClusterMap = IndexMap::new();

    for (i, key) in keys.iter().enumerate() {
        if consumed.contains(key.as_str()) {
            continue;
        }
        let mut base = groups[key.as_str()].clone();
        for other_key in &keys[i + 1..] {
            if consumed.contains(other_key.as_str()) {
                continue;
            }
            let other = &groups[other_key.as_str()];
            if should_merge(&base, other, threshold, sim) {
                base.extend(other.iter().cloned());
                consumed.insert(other_key.as_str());
            }
        }
        merged.insert(key.clone(), base);
    }
    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
