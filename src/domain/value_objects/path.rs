//! Path helpers
//!
//! Output paths are kept as forward-slash strings relative to the output
//! directory; URLs are those paths with a single leading `/`. Source paths
//! are resolved lexically (no symlink resolution, no I/O).

use std::path::{Component, Path, PathBuf};

/// Strip leading `./` segments and leading slashes.
///
/// `./a.js`, `.//a.js`, `/a.js` and `a.js` all become `a.js`.
pub fn fix_relative_path(path: &str) -> String {
    let mut rest = path;
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped.trim_start_matches('/');
    }
    rest.trim_start_matches('/').to_string()
}

/// URL under which an output path is served
pub fn to_url(path: &str) -> String {
    format!("/{}", fix_relative_path(path))
}

/// Ensure exactly one leading slash is present (external paths)
pub fn with_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// POSIX `dirname`: `y/hi.txt` → `y`, `hi.txt` → `.`
pub fn dirname(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(i) => &trimmed[..i],
        None => ".",
    }
}

/// POSIX `basename`: `y/hi.txt` → `hi.txt`
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}

/// Extension without the dot; empty for dotfiles and extensionless names
pub fn extname(path: &str) -> &str {
    let base = basename(path);
    match base.rfind('.') {
        Some(0) | None => "",
        Some(i) => &base[i + 1..],
    }
}

/// Basename without its extension
pub fn stem(path: &str) -> &str {
    let base = basename(path);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(i) => &base[..i],
    }
}

/// Resolve `path` against `base` lexically, like `path.resolve(base, path)`.
pub fn resolve(base: &Path, path: &str) -> PathBuf {
    normalize(&base.join(path))
}

/// Remove `.` components and fold `..` components without touching disk
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Forward-slash rendering of a relative path (for globs and output names)
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
