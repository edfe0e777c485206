//! Configuration module for assetplan
//!
//! Configuration sources, highest priority first:
//! 1. CLI flags
//! 2. Environment variables (ASSETPLAN_*)
//! 3. The config file (`assetplan.toml` or `assetplan.json`)
//! 4. Built-in defaults

use std::path::Path;

use crate::error::PlanResult;

mod loader;
mod types;

pub use loader::{discover, dry_run_from_env, ConfigWarning, CONFIG_FILES};
pub use types::{Config, ManifestOutput, OutputConfig, PluginSpec};

/// Load a config file, discarding warnings
pub fn load(path: &Path) -> PlanResult<Config> {
    Config::load(path)
}
