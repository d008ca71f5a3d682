use log::debug;

use crate::cell::RawRow;
use crate::config::Settings;
use crate::error::{NODE_COLUMN, NodeStatusError, Result};

/// Site allow-list for node names. Matching is case-sensitive.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeFilter {
    prefixes: Vec<String>,
    excluded: String,
}

impl Default for NodeFilter {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl NodeFilter {
    /// Filter keeping `prefixes` and dropping names containing `excluded`.
    /// An empty `excluded` drops nothing.
    pub fn new(prefixes: Vec<String>, excluded: impl Into<String>) -> Self {
        Self {
            prefixes,
            excluded: excluded.into(),
        }
    }

    /// Filter built from the session settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.prefixes.clone(), settings.excluded.clone())
    }

    /// A node is kept when it starts with an allowed prefix and does not
    /// contain the excluded substring.
    pub fn matches(&self, node: &str) -> bool {
        let allowed = self.prefixes.iter().any(|p| node.starts_with(p.as_str()));
        let excluded = !self.excluded.is_empty() && node.contains(self.excluded.as_str());
        allowed && !excluded
    }

    /// Keep the rows whose `Node` passes [`NodeFilter::matches`].
    ///
    /// An empty result is reported as [`NodeStatusError::NoMatchingRows`].
    pub fn filter(&self, rows: Vec<RawRow>) -> Result<Vec<RawRow>> {
        let total = rows.len();
        let kept: Vec<RawRow> = rows
            .into_iter()
            .filter(|row| self.matches(&row.text_or(NODE_COLUMN, "")))
            .collect();

        debug!("filter kept {} of {} rows", kept.len(), total);
        if kept.is_empty() {
            return Err(NodeStatusError::NoMatchingRows);
        }
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    #[test]
    fn prefixes_and_exclusion() {
        let filter = NodeFilter::default();
        assert!(filter.matches("ATM-SUL-01"));
        assert!(filter.matches("BR-DUK"));
        assert!(!filter.matches("atm-sul-01"));
        assert!(!filter.matches("ATM-SUL-SW1"));
        assert!(!filter.matches("XATM-SUL-01"));
        assert!(!filter.matches(""));
    }

    #[test]
    fn numeric_zero_node_is_treated_as_empty() {
        let filter = NodeFilter::new(vec!["0".into()], "-SW");
        let rows = vec![vec![("Node", CellValue::Number(0.0))].into_iter().collect()];
        assert!(matches!(
            filter.filter(rows),
            Err(NodeStatusError::NoMatchingRows)
        ));
    }

    #[test]
    fn empty_result_is_reported() {
        let filter = NodeFilter::default();
        let rows = vec![
            vec![("Node", CellValue::from("CORE-01"))].into_iter().collect(),
            RawRow::new(),
        ];
        assert!(matches!(
            filter.filter(rows),
            Err(NodeStatusError::NoMatchingRows)
        ));
    }
}
