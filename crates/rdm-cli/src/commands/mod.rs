pub mod check;
pub mod tree;

use std::path::{Path, PathBuf};

use rdm_core::{DesignConfig, DesignScript, Module};

/// Read `script`, with engine settings from `config` when given
pub fn load_design(
    script: &Path,
    config: Option<&PathBuf>,
) -> Result<Module, Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => DesignConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => DesignConfig::default(),
    };
    let json = std::fs::read_to_string(script)?;
    Ok(DesignScript::from_json_str(&json)?.load(config)?)
}
