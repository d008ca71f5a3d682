use std::cmp::Ordering;

use crate::collation::locale_compare;
use crate::record::{NormalizedRecord, Status};

/// DOWN rows first, then node name in locale order.
pub fn compare_records(a: &NormalizedRecord, b: &NormalizedRecord) -> Ordering {
    status_rank(a.status())
        .cmp(&status_rank(b.status()))
        .then_with(|| locale_compare(a.node(), b.node()))
}

fn status_rank(status: Status) -> u8 {
    match status {
        Status::Down => 0,
        Status::Up => 1,
    }
}

/// Order records for display
///
/// Stable sort by [`compare_records`]; sorting an already sorted sequence
/// leaves it unchanged.
///
/// # Arguments
/// * `records` - Normalized records in any order
///
/// # Returns
/// * `Vec<NormalizedRecord>` - The same records, DOWN first
pub fn sort_records(mut records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    records.sort_by(compare_records);
    records
}
