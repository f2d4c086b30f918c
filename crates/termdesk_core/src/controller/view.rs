//! Derived view of the cache: label search and label sort.

use crate::model::contract_term::ContractTerm;

/// Records whose label contains `query`, case-insensitively, in cache order.
///
/// The query is trimmed first; a blank query matches everything.
pub fn filter_by_label(records: &[ContractTerm], query: &str) -> Vec<ContractTerm> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| record.label.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Sorts by lower-cased label. Stable: equal labels keep their relative order.
pub fn sort_by_label(records: &mut [ContractTerm], ascending: bool) {
    records.sort_by_cached_key(|record| record.label.to_lowercase());
    if !ascending {
        records.reverse();
    }
}
