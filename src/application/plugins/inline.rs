//! Inline plugin
//!
//! Replaces a local manifest entry with a `data:` URL carrying the file
//! itself, and drops the op that would have written the file. Other URL and
//! manifest entries served from the same file follow.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use super::Plugin;
use crate::application::state::State;
use crate::domain::entities::{ManifestEntry, Op};
use crate::domain::value_objects::path::{fix_relative_path, to_url};
use crate::domain::value_objects::UrlEntry;
use crate::error::PlanResult;

/// What the inlining criteria see for one manifest entry
pub struct InlineArg<'a> {
    pub manifest_name: &'a str,
    /// Absolute path of the source file, when there is one
    pub src: Option<&'a Path>,
    /// Output path the entry points at
    pub dest: &'a str,
    op: &'a Op,
}

impl InlineArg<'_> {
    /// Size of the file in bytes; reads metadata only on demand
    pub fn size(&self) -> PlanResult<u64> {
        self.op.size()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineDecision {
    Keep,
    /// Inline with a mime type guessed from the destination, then the source
    Inline,
    /// Inline with this mime type; empty omits it from the URL
    InlineAs(String),
}

type Criteria = Rc<dyn Fn(&InlineArg<'_>) -> InlineDecision>;

#[derive(Clone)]
pub struct Inline {
    criteria: Criteria,
}

impl Inline {
    pub fn new(criteria: impl Fn(&InlineArg<'_>) -> InlineDecision + 'static) -> Self {
        Self {
            criteria: Rc::new(criteria),
        }
    }

    /// Inline every file of at most `max_size` bytes
    pub fn max_size(max_size: u64, mime: Option<String>) -> Self {
        Self::new(move |arg| match arg.size() {
            Ok(size) if size <= max_size => match &mime {
                Some(mime) => InlineDecision::InlineAs(mime.clone()),
                None => InlineDecision::Inline,
            },
            _ => InlineDecision::Keep,
        })
    }
}

impl fmt::Debug for Inline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Inline(..)")
    }
}

fn guess_mime(paths: &[Option<&Path>]) -> Option<String> {
    paths
        .iter()
        .flatten()
        .find_map(|path| mime_guess::from_path(path).first())
        .map(|mime| mime.essence_str().to_string())
}

impl Plugin for Inline {
    fn name(&self) -> &str {
        "inline"
    }

    fn run(&self, state: &mut State) -> PlanResult<()> {
        let candidates: Vec<(String, String)> = state
            .manifest()
            .entries()
            .iter()
            .filter_map(|(name, entry)| match entry {
                ManifestEntry::Local(path) => Some((name.clone(), fix_relative_path(path))),
                _ => None,
            })
            .collect();

        for (name, dest) in candidates {
            let Some((id, op)) = state
                .ops()
                .iter()
                .rev()
                .find(|p| p.op.to().path() == dest)
                .map(|p| (p.id, p.op.clone()))
            else {
                continue;
            };

            let arg = InlineArg {
                manifest_name: &name,
                src: op.source().map(|s| s.abs()),
                dest: &dest,
                op: &op,
            };
            let mime = match (self.criteria)(&arg) {
                InlineDecision::Keep => continue,
                InlineDecision::InlineAs(mime) => mime,
                InlineDecision::Inline => {
                    match guess_mime(&[Some(Path::new(&dest)), arg.src]) {
                        Some(mime) => mime,
                        None => {
                            state.add_error(format!(
                                "Error inlining {}. Unable to discern mime-type for {}",
                                name, dest
                            ));
                            continue;
                        }
                    }
                }
            };
            let data = match op.content() {
                Ok(content) => STANDARD.encode(content),
                Err(e) => {
                    state.add_error(format!("Error inlining {}. {}", name, e));
                    continue;
                }
            };

            let url = if mime.is_empty() {
                format!("data:base64,{}", data)
            } else {
                format!("data:{};base64,{}", mime, data)
            };
            debug!(manifest = %name, %dest, bytes = data.len(), "inlining");

            state.remove_op(id);
            let old_url = to_url(&dest);
            state.map_urls(|entry| {
                if entry.url == old_url {
                    entry.url = url.clone();
                }
            });
            // Every local entry served from the removed file now carries the data
            state.manifest_mut().map_values(|entry| match entry {
                ManifestEntry::Local(path) if to_url(path) == old_url => {
                    ManifestEntry::Url(UrlEntry::new(url.clone()))
                }
                other => other.clone(),
            });
        }
        Ok(())
    }
}
