//! Locale-style string ordering for node names.
//!
//! Names are compared with the Unicode root collation (CLDR root, tertiary
//! strength, punctuation non-ignorable), which is what a browser's default
//! `localeCompare` uses: whitespace and punctuation in CLDR order before
//! digits before letters, accents and then case only breaking ties.
//! Strings the collator considers equal are finally ordered by code point
//! so the order stays total.

use icu_collator::{Collator, CollatorOptions};
use log::warn;
use std::cmp::Ordering;

thread_local! {
    static ROOT: Option<Collator> = Collator::try_new(&Default::default(), CollatorOptions::new())
        .map_err(|err| warn!("root collation unavailable, ordering by code point: {:?}", err))
        .ok();
}

/// Compare two strings with the root locale collation.
///
/// # Arguments
/// * `a` - Left-hand string
/// * `b` - Right-hand string
///
/// # Returns
/// * `Ordering` - `Equal` only for identical strings
///
/// # Examples
/// ```
/// use node_status::collation::locale_compare;
/// use std::cmp::Ordering;
///
/// assert_eq!(locale_compare("ATM-SUL-a", "ATM-SUL-B"), Ordering::Less);
/// assert_eq!(locale_compare("ATM-SUL_1", "ATM-SUL-1"), Ordering::Less);
/// ```
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    ROOT.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => Ordering::Equal,
    })
    .then_with(|| a.cmp(b))
}
