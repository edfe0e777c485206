//! OutputFile entity - a planned destination under the output directory

use std::path::{Path, PathBuf};

use crate::domain::value_objects::path::{fix_relative_path, resolve, to_url};

/// A file that an op will create, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputFile {
    ctx: PathBuf,
    path: String,
    abs: PathBuf,
}

impl OutputFile {
    pub fn new(ctx: impl Into<PathBuf>, path: &str) -> Self {
        let ctx = ctx.into();
        let path = fix_relative_path(path);
        let abs = resolve(&ctx, &path);
        Self { ctx, path, abs }
    }

    /// Output directory
    pub fn ctx(&self) -> &Path {
        &self.ctx
    }

    /// Normalised path relative to the output directory
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn abs(&self) -> &Path {
        &self.abs
    }

    /// The URL this file is served under (`/` + path)
    pub fn url(&self) -> String {
        to_url(&self.path)
    }

    /// Same output directory, different path
    pub fn with_new_path(&self, path: &str) -> Self {
        Self::new(self.ctx.clone(), path)
    }
}
