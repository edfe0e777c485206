//! LocalSrc entity - a source file matched under a context directory
//!
//! Content and size are read lazily and cached in compute-once cells.
//! Descriptors handed out by the same [`SourceCache`] for the same physical
//! file share their cells, so a file is read at most once per build.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::domain::value_objects::path::{fix_relative_path, resolve};
use crate::error::{PlanError, PlanResult};

#[derive(Debug, Default)]
struct SourceCells {
    content: OnceCell<Result<Vec<u8>, String>>,
    size: OnceCell<Result<u64, String>>,
}

/// A source file: context directory plus a path relative to it
#[derive(Clone)]
pub struct LocalSrc {
    ctx: PathBuf,
    path: String,
    abs: PathBuf,
    cells: Rc<SourceCells>,
}

impl LocalSrc {
    /// Create a descriptor with its own (unshared) cache
    pub fn new(ctx: impl Into<PathBuf>, path: &str) -> Self {
        let ctx = ctx.into();
        let path = fix_relative_path(path);
        let abs = resolve(&ctx, &path);
        Self {
            ctx,
            path,
            abs,
            cells: Rc::default(),
        }
    }

    /// Directory the path is relative to
    pub fn ctx(&self) -> &Path {
        &self.ctx
    }

    /// Normalised relative path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Absolute path
    pub fn abs(&self) -> &Path {
        &self.abs
    }

    /// File content, read on first access
    pub fn content(&self) -> PlanResult<&[u8]> {
        self.cells
            .content
            .get_or_init(|| std::fs::read(&self.abs).map_err(|e| e.to_string()))
            .as_deref()
            .map_err(|message| self.read_error(message))
    }

    /// File content as (lossy) UTF-8 text
    pub fn content_string(&self) -> PlanResult<String> {
        Ok(String::from_utf8_lossy(self.content()?).into_owned())
    }

    /// File size in bytes, from the cached content when already read
    pub fn size(&self) -> PlanResult<u64> {
        if let Some(Ok(content)) = self.cells.content.get() {
            return Ok(content.len() as u64);
        }
        self.cells
            .size
            .get_or_init(|| {
                std::fs::metadata(&self.abs)
                    .map(|m| m.len())
                    .map_err(|e| e.to_string())
            })
            .clone()
            .map_err(|message| self.read_error(&message))
    }

    /// Whether both descriptors share one content cache
    pub fn shares_cache_with(&self, other: &LocalSrc) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells)
    }

    fn read_error(&self, message: &str) -> PlanError {
        PlanError::Read {
            path: self.abs.clone(),
            message: message.to_string(),
        }
    }
}

impl fmt::Debug for LocalSrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSrc")
            .field("ctx", &self.ctx)
            .field("path", &self.path)
            .finish()
    }
}

impl PartialEq for LocalSrc {
    fn eq(&self, other: &Self) -> bool {
        self.ctx == other.ctx && self.path == other.path
    }
}

impl Eq for LocalSrc {}

/// Hands out descriptors that share caches per absolute path
#[derive(Debug, Default)]
pub struct SourceCache {
    cells: HashMap<PathBuf, Rc<SourceCells>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor for `path` under `ctx`, sharing any existing cache
    pub fn get(&mut self, ctx: &Path, path: &str) -> LocalSrc {
        let mut src = LocalSrc::new(ctx, path);
        let cells = self
            .cells
            .entry(src.abs.clone())
            .or_insert_with(|| Rc::clone(&src.cells));
        src.cells = Rc::clone(cells);
        src
    }

    /// Number of distinct files seen
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
