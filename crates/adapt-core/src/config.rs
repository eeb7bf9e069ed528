//! Controller configuration

use crate::error::{AdaptError, Result};
use crate::state::DevtoolsPosition;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Adapt controller configuration
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptConfig {
    /// Docking position used when the store has no saved state
    pub devtools_position: DevtoolsPosition,
    /// Component preselected in the inspector form
    pub default_component: String,
    /// Persist changes through the store
    pub save_on_change: bool,
    /// JSON state file for [`crate::FileStateStore`]
    pub state_file: Option<PathBuf>,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl AdaptConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default devtools position
    #[inline]
    #[must_use]
    pub fn with_devtools_position(mut self, position: DevtoolsPosition) -> Self {
        self.devtools_position = position;
        self
    }

    /// With preselected inspector component
    #[inline]
    #[must_use]
    pub fn with_default_component(mut self, name: impl Into<String>) -> Self {
        self.default_component = name.into();
        self
    }

    /// With persistence switched on or off
    #[inline]
    #[must_use]
    pub fn with_save_on_change(mut self, save: bool) -> Self {
        self.save_on_change = save;
        self
    }

    /// With state file
    #[inline]
    #[must_use]
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    /// With log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`AdaptError::Config`] on invalid TOML or values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| AdaptError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns [`AdaptError::Config`] if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AdaptError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Check field values
    ///
    /// # Errors
    /// Returns [`AdaptError::Config`] if the default component is empty.
    pub fn validate(&self) -> Result<()> {
        if self.default_component.trim().is_empty() {
            return Err(AdaptError::Config("default_component must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for AdaptConfig {
    fn default() -> Self {
        Self {
            devtools_position: DevtoolsPosition::Left,
            default_component: "Box".to_owned(),
            save_on_change: true,
            state_file: None,
            log_filter: "info".to_owned(),
            log_format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(AdaptConfig::from_toml_str("").unwrap(), AdaptConfig::default());
    }

    #[test]
    fn partial_toml() {
        let config = AdaptConfig::from_toml_str(
            r#"
            devtools_position = "bottom"
            state_file = "state/adapt.json"
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.devtools_position, DevtoolsPosition::Bottom);
        assert_eq!(config.state_file, Some(PathBuf::from("state/adapt.json")));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.default_component, "Box");
    }

    #[test]
    fn bad_values_are_config_errors() {
        assert!(matches!(
            AdaptConfig::from_toml_str("devtools_position = \"middle\""),
            Err(AdaptError::Config(_))
        ));
        assert!(matches!(
            AdaptConfig::from_toml_str("default_component = \" \""),
            Err(AdaptError::Config(_))
        ));
    }

    #[test]
    fn builders() {
        let config = AdaptConfig::new()
            .with_default_component("Table")
            .with_save_on_change(false)
            .with_log_filter("adapt_core=debug");
        assert_eq!(config.default_component, "Table");
        assert!(!config.save_on_change);
        assert_eq!(config.log_filter, "adapt_core=debug");
    }
}
