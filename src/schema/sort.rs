//! Deterministic ordering for emission (spec §4.C, §5 "Ordering guarantees").
//!
//! UniqueKeys, ForeignKeys, and Indexes are sorted by `(constraint-name,
//! column-list-lexicographic)` so that generated output does not depend on
//! the order in which a parallel file-processing pass happened to produce
//! them.

use super::types::{ForeignKey, Index, UniqueKey};

fn sort_key<'a>(name: &'a Option<String>, columns: &'a [String]) -> (&'a str, Vec<&'a str>) {
    (
        name.as_deref().unwrap_or(""),
        columns.iter().map(String::as_str).collect(),
    )
}

pub fn sort_unique_keys(keys: &mut [UniqueKey]) {
    keys.sort_by(|a, b| sort_key(&a.name, &a.columns).cmp(&sort_key(&b.name, &b.columns)));
}

pub fn sort_foreign_keys(keys: &mut [ForeignKey]) {
    keys.sort_by(|a, b| sort_key(&a.name, &a.columns).cmp(&sort_key(&b.name, &b.columns)));
}

pub fn sort_indexes(indexes: &mut [Index]) {
    indexes.sort_by(|a, b| sort_key(&a.name, &a.columns).cmp(&sort_key(&b.name, &b.columns)));
}
