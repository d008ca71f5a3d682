use serde::Deserialize;
use std::path::Path;

use crate::error::{NodeStatusError, Result};

/// Site prefixes kept by default.
pub const DEFAULT_PREFIXES: [&str; 6] = ["ATM-SUL", "ATM-DUK", "ATM-ERB", "BR-SUL", "BR-DUK", "BR-ERB"];
/// Switch nodes are dropped.
pub const DEFAULT_EXCLUDED: &str = "-SW";
pub const WORKBOOK_FILE_NAME: &str = "Modified_Node_Status.xlsx";
pub const WORKBOOK_SHEET_NAME: &str = "Modified Status";
pub const SNAPSHOT_FILE_NAME: &str = "node_status_snapshot.png";

/// Settings for one session.
///
/// Defaults reproduce the fixed behaviour of the upload tool; a TOML file
/// may override any subset of them.
///
/// ```toml
/// prefixes = ["ATM-SUL", "BR-SUL"]
/// excluded = "-SW"
/// snapshot_scale = 3
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Node name prefixes a row must start with to be kept
    pub prefixes: Vec<String>,

    /// Substring that removes a row when present in its node name
    pub excluded: String,

    /// File name suggested for the styled workbook
    pub workbook_file_name: String,

    /// Name of the single worksheet in the styled workbook
    pub sheet_name: String,

    /// File name suggested for the rendered snapshot
    pub snapshot_file_name: String,

    /// Rasterization scale of the snapshot (device pixels per layout pixel)
    pub snapshot_scale: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            excluded: DEFAULT_EXCLUDED.to_string(),
            workbook_file_name: WORKBOOK_FILE_NAME.to_string(),
            sheet_name: WORKBOOK_SHEET_NAME.to_string(),
            snapshot_file_name: SNAPSHOT_FILE_NAME.to_string(),
            snapshot_scale: 2,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    ///
    /// Keys that are absent keep their default value. The result is
    /// checked before it is returned.
    ///
    /// # Arguments
    /// * `source` - TOML document
    ///
    /// # Returns
    /// * `Result<Settings>` - The settings, or `NodeStatusError::Config`
    ///
    /// # Examples
    /// ```
    /// use node_status::config::Settings;
    ///
    /// let settings = Settings::from_toml_str("snapshot_scale = 3").unwrap();
    /// assert_eq!(settings.snapshot_scale, 3);
    /// assert_eq!(settings.excluded, "-SW");
    /// assert!(Settings::from_toml_str("prefixes = []").is_err());
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(source).map_err(|e| NodeStatusError::Config(e.to_string()))?;
        settings.check()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the settings file
    ///
    /// # Returns
    /// * `Result<Settings>` - The settings, or `NodeStatusError::Config` when
    ///   the file cannot be read or parsed
    ///
    /// # Examples
    /// ```no_run
    /// use node_status::config::Settings;
    ///
    /// match Settings::load("node-status.toml") {
    ///     Ok(settings) => println!("{} prefixes", settings.prefixes.len()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| NodeStatusError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    fn check(&self) -> Result<()> {
        if self.prefixes.is_empty() {
            return Err(NodeStatusError::Config("prefixes must not be empty".into()));
        }
        if self.snapshot_scale == 0 || self.snapshot_scale > 8 {
            return Err(NodeStatusError::Config(format!(
                "snapshot_scale must be between 1 and 8, got {}",
                self.snapshot_scale
            )));
        }
        if self.sheet_name.is_empty() || self.sheet_name.chars().count() > 31 {
            return Err(NodeStatusError::Config(
                "sheet_name must be 1 to 31 characters".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = Settings::from_toml_str("snapshot_scale = 3\n").unwrap();
        assert_eq!(settings.snapshot_scale, 3);
        assert_eq!(settings.prefixes.len(), 6);
        assert_eq!(settings.workbook_file_name, "Modified_Node_Status.xlsx");
    }

    #[test]
    fn rejects_empty_prefix_list() {
        let err = Settings::from_toml_str("prefixes = []\n").unwrap_err();
        assert!(matches!(err, NodeStatusError::Config(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(Settings::from_toml_str("prefixes = ").is_err());
    }
}
