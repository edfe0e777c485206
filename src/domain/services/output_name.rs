//! Output filename templates
//!
//! A template such as `[path]/[name]-[hash:8].[ext]` is compiled once into
//! a list of segments. Rendering substitutes path components of the matched
//! file and content digests; content is only requested when the template
//! actually contains a hash token, and each digest is computed at most once
//! per render.

use std::collections::HashMap;

use crate::domain::value_objects::path::{basename, dirname, extname, stem};
use crate::domain::value_objects::HashAlgo;
use crate::error::PlanResult;

/// Defaults applied to `[hash]` / `[hash:N]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameOptions {
    pub default_hash_algo: HashAlgo,
    pub default_hash_width: usize,
}

impl Default for NameOptions {
    fn default() -> Self {
        Self {
            default_hash_algo: HashAlgo::Sha256,
            default_hash_width: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathToken {
    Basename,
    Name,
    Ext,
    Path,
}

impl PathToken {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "basename" => Some(PathToken::Basename),
            "name" => Some(PathToken::Name),
            "ext" => Some(PathToken::Ext),
            "path" => Some(PathToken::Path),
            _ => None,
        }
    }

    fn apply<'a>(&self, path: &'a str) -> &'a str {
        match self {
            PathToken::Basename => basename(path),
            PathToken::Name => stem(path),
            PathToken::Ext => extname(path),
            PathToken::Path => dirname(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Path(PathToken),
    Hash { algo: HashAlgo, width: Option<usize> },
}

/// A compiled filename template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNameFn {
    template: String,
    segments: Vec<Segment>,
}

impl OutputNameFn {
    pub fn compile(template: &str, options: &NameOptions) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(open) = rest.find('[') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let token = after
                .find(']')
                .and_then(|close| parse_token(&after[..close], options).map(|seg| (seg, close)));
            match token {
                Some((segment, close)) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                    rest = &after[close + 1..];
                }
                None => {
                    literal.push('[');
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            template: template.to_string(),
            segments,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether rendering needs the file content
    pub fn reads_content(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Hash { .. }))
    }

    /// Render the name for `path` (relative to its source dir). `content` is
    /// called at most once, and only when a hash token is present.
    pub fn render<'c>(
        &self,
        path: &str,
        content: impl FnOnce() -> PlanResult<&'c [u8]>,
    ) -> PlanResult<String> {
        let mut content = Some(content);
        let mut bytes: Option<&'c [u8]> = None;
        let mut digests: HashMap<HashAlgo, String> = HashMap::new();
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Path(token) => out.push_str(token.apply(path)),
                Segment::Hash { algo, width } => {
                    let data = match bytes {
                        Some(data) => data,
                        None => {
                            let load = content.take();
                            let data = match load {
                                Some(load) => load()?,
                                None => &[],
                            };
                            bytes = Some(data);
                            data
                        }
                    };
                    let digest = digests.entry(*algo).or_insert_with(|| algo.hex(data));
                    match width {
                        Some(w) if *w < digest.len() => out.push_str(&digest[..*w]),
                        _ => out.push_str(digest),
                    }
                }
            }
        }
        Ok(out)
    }
}

fn parse_token(inner: &str, options: &NameOptions) -> Option<Segment> {
    if let Some(token) = PathToken::parse(inner) {
        return Some(Segment::Path(token));
    }
    let (name, width) = match inner.split_once(':') {
        Some((name, digits)) => (name, Some(digits.parse::<usize>().ok()?)),
        None => (inner, None),
    };
    if name == "hash" {
        return Some(Segment::Hash {
            algo: options.default_hash_algo,
            width: Some(width.unwrap_or(options.default_hash_width)),
        });
    }
    let algo = name.parse::<HashAlgo>().ok()?;
    Some(Segment::Hash { algo, width })
}
