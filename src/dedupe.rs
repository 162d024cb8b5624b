//! Row deduplication ahead of matching.
//!
//! Order-preserving, first-occurrence-wins. Repeats are discarded
//! silently; they are not an error condition.

use std::collections::HashSet;

use crate::identity::NormalizedIdentity;
use crate::record::InputRow;

/// Collapses rows whose full normalized identity tuple repeats.
///
/// Used by the preprocessing path (directory uploads). The primary
/// enrichment path dedupes on normalized domain instead, see
/// [`dedupe_by_domain`].
#[must_use]
pub fn dedupe_rows(rows: Vec<InputRow>) -> Vec<InputRow> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(NormalizedIdentity::from_row(row).identity_key()))
        .collect()
}

/// Collapses `(row, identity)` pairs sharing a non-empty normalized
/// domain. Rows without a domain are never collapsed.
#[must_use]
pub fn dedupe_by_domain(
    pairs: Vec<(InputRow, NormalizedIdentity)>,
) -> Vec<(InputRow, NormalizedIdentity)> {
    let mut seen: HashSet<String> = HashSet::with_capacity(pairs.len());
    pairs
        .into_iter()
        .filter(|(_, identity)| {
            identity.domain.is_empty() || seen.insert(identity.domain.clone())
        })
        .collect()
}
