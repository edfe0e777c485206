//! SourceTree port - glob matching over source directories

use std::path::Path;

use crate::error::PlanResult;

/// Finds source files for local assets and CDN integrity inputs
pub trait SourceTree {
    /// Files (not directories) under `dir` matching `pattern`, as
    /// forward-slash paths relative to `dir`, sorted.
    fn glob(&self, dir: &Path, pattern: &str) -> PlanResult<Vec<String>>;

    fn is_dir(&self, path: &Path) -> bool;
}
