//! Glob walker
//!
//! Implements the SourceTree port with `globset` matching over an
//! `ignore` directory walk. VCS ignore files are not consulted; every file
//! under the source directory is a candidate.

use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use tracing::trace;

use crate::domain::ports::SourceTree;
use crate::domain::value_objects::path::to_slash;
use crate::error::{PlanError, PlanResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct GlobWalker;

impl GlobWalker {
    pub fn new() -> Self {
        Self
    }

    fn compile(pattern: &str) -> PlanResult<GlobMatcher> {
        GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map(|glob| glob.compile_matcher())
            .map_err(|e| PlanError::Glob {
                pattern: pattern.to_string(),
                message: e.kind().to_string(),
            })
    }
}

/// Dotfiles only match when the pattern spells out the leading dot
fn hidden_allowed(pattern: &str, rel: &str) -> bool {
    let hidden = rel.split('/').any(|segment| segment.starts_with('.'));
    !hidden || pattern.split('/').any(|segment| segment.starts_with('.'))
}

impl SourceTree for GlobWalker {
    fn glob(&self, dir: &Path, pattern: &str) -> PlanResult<Vec<String>> {
        let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
        let matcher = Self::compile(pattern)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in WalkBuilder::new(dir).standard_filters(false).build() {
            let entry = entry.map_err(|e| PlanError::Glob {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(dir) else {
                continue;
            };
            let rel = to_slash(rel);
            if matcher.is_match(&rel) && hidden_allowed(pattern, &rel) {
                found.push(rel);
            }
        }
        found.sort();
        trace!(dir = %dir.display(), pattern, matches = found.len(), "glob");
        Ok(found)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
