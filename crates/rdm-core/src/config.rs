use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Per-module engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    /// Committed transactions kept for undo
    pub undo_limit: usize,
    /// Maintain the live element id map instead of walking containers
    pub track_element_ids: bool,
    /// Run triggered validators after commit, undo and redo
    pub validate_on_commit: bool,
    /// Collapse notifications of a transaction before delivery
    pub filter_events: bool,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            undo_limit: 100,
            track_element_ids: true,
            validate_on_commit: true,
            filter_events: true,
        }
    }
}

impl DesignConfig {
    /// # Errors
    ///
    /// Returns `Config` if the document is not valid TOML for this shape.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
