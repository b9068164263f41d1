//! Attribute filter over the normalized catalogue.

use std::collections::BTreeSet;
use std::sync::Arc;

use aedmap_core::{FilterState, Record};

/// Returns the records satisfying `state`, in their original relative order.
#[must_use]
pub fn filter(records: &[Arc<Record>], state: &FilterState) -> Vec<Arc<Record>> {
    records
        .iter()
        .filter(|r| state.matches(r))
        .cloned()
        .collect()
}

/// Distinct non-empty parishes, sorted, for populating the parish selector.
#[must_use]
pub fn parish_options(records: &[Arc<Record>]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.parish.as_str())
        .filter(|p| !p.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}
