//! HTML plugin and manifest URL replacement
//!
//! In matching HTML files:
//!
//! - `<require asset="X"/>` becomes the load tags for X and everything it
//!   depends on, dependencies first, each asset once;
//! - `<require manifest="Y"/>` becomes the load tag for manifest entry Y;
//! - `assetplan://manifest/NAME` becomes the URL of manifest entry NAME.
//!
//! [`ManifestUrls`] applies only the last rewrite, to any text file.

use std::collections::HashSet;
use std::rc::Rc;

use regex::{Captures, Regex};

use super::modify::{FilenameTest, Modify};
use super::Plugin;
use crate::application::state::{Modification, State};
use crate::domain::entities::ManifestEntry;
use crate::domain::value_objects::{As, UrlEntry};
use crate::error::{PlanError, PlanResult};

const REQUIRE_TAG: &str = r"(?is)<require\b([^>]*?)/?>(?:\s*</require\s*>)?";
const ATTRIBUTE: &str = r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#;
const ASSETPLAN_URL: &str = r#"assetplan://[^\s"'()<>]*"#;
const HTML_FILES: &str = r"\.html$";

fn compile(plugin: &str, pattern: &str) -> PlanResult<Regex> {
    Regex::new(pattern).map_err(|e| PlanError::InvalidPlugin {
        plugin: plugin.to_string(),
        message: e.to_string(),
    })
}

struct Patterns {
    require: Regex,
    attribute: Regex,
    url: Regex,
}

impl Patterns {
    fn new() -> PlanResult<Self> {
        Ok(Self {
            require: compile("html", REQUIRE_TAG)?,
            attribute: compile("html", ATTRIBUTE)?,
            url: compile("html", ASSETPLAN_URL)?,
        })
    }

    fn attributes(&self, raw: &str) -> Vec<(String, String)> {
        self.attribute
            .captures_iter(raw)
            .map(|c| {
                let value = c.get(2).or_else(|| c.get(3)).map_or("", |m| m.as_str());
                (
                    c[1].to_ascii_lowercase(),
                    html_escape::decode_html_entities(value).into_owned(),
                )
            })
            .collect()
    }
}

fn attribute<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// The HTML needed to load `entry`, if its kind is known
pub fn load_tag(entry: &UrlEntry) -> Option<String> {
    let kind = entry.as_.or_else(|| {
        if entry.url.ends_with(".js") {
            Some(As::Script)
        } else if entry.url.ends_with(".css") {
            Some(As::Style)
        } else {
            None
        }
    })?;

    let url = html_escape::encode_double_quoted_attribute(&entry.url);
    let mut attrs = match kind {
        As::Script => format!("src=\"{}\"", url),
        As::Style => format!("href=\"{}\"", url),
    };
    if let Some(integrity) = &entry.integrity {
        attrs.push_str(&format!(
            " integrity=\"{}\"",
            html_escape::encode_double_quoted_attribute(integrity)
        ));
    }
    if let Some(crossorigin) = entry.crossorigin {
        attrs.push_str(&format!(" crossorigin=\"{}\"", crossorigin));
    }

    Some(match kind {
        As::Script => format!("<script {}></script>", attrs),
        As::Style => format!("<link rel=\"stylesheet\" {}>", attrs),
    })
}

fn push_tags(state: &mut State, entries: &[UrlEntry], links: &mut Vec<String>) {
    for entry in entries.iter().filter(|e| !e.is_transitive()) {
        match load_tag(entry) {
            Some(tag) => links.push(tag),
            None => state.add_error(format!(
                "Don't know what kind of HTML tag is needed to load: {}",
                entry.url
            )),
        }
    }
}

fn require_asset(state: &mut State, name: &str) -> String {
    let order: Vec<String> = match state.graph().and_then(|g| g.load_order(name)) {
        Some(order) => order.into_iter().map(str::to_string).collect(),
        None => vec![name.to_string()],
    };

    let mut links = Vec::new();
    let mut seen = HashSet::new();
    for asset in order {
        if !state.all_urls().contains_key(&asset) {
            state.add_error(format!("Asset referenced in <require/> not found: {}", asset));
            continue;
        }
        if seen.insert(asset.clone()) {
            let entries = state.urls(&asset).to_vec();
            push_tags(state, &entries, &mut links);
        }
    }
    links.join("\n")
}

fn require_manifest(state: &mut State, key: &str) -> String {
    let entries = match state.manifest().get(key) {
        None => {
            state.add_error(format!("Manifest entry not found: {}", key));
            return String::new();
        }
        Some(ManifestEntry::List(urls)) => urls.iter().map(UrlEntry::new).collect(),
        Some(entry) => entry.to_url_entry().into_iter().collect::<Vec<_>>(),
    };
    let mut links = Vec::new();
    push_tags(state, &entries, &mut links);
    links.join("\n")
}

fn expand_require_tags(state: &mut State, patterns: &Patterns, html: &str) -> String {
    patterns
        .require
        .replace_all(html, |c: &Captures<'_>| {
            let attrs = patterns.attributes(&c[1]);
            if let Some(asset) = attribute(&attrs, "asset") {
                require_asset(state, asset)
            } else if let Some(key) = attribute(&attrs, "manifest") {
                require_manifest(state, key)
            } else {
                state.add_error("<require/> tag needs an 'asset' attribute.");
                String::new()
            }
        })
        .into_owned()
}

fn manifest_url(state: &mut State, url: &str) -> Option<String> {
    let Some(name) = url
        .strip_prefix("assetplan://")
        .and_then(|path| path.strip_prefix("manifest/"))
    else {
        state.add_error(format!("Invalid assetplan url: {}", url));
        return None;
    };
    match state.manifest().get(name) {
        None => {
            state.add_error(format!("Manifest entry not found: {}", name));
            None
        }
        Some(entry) => match entry.resolve_url(true) {
            Some(resolved) => Some(resolved.to_string()),
            None => {
                state.add_error(format!("URL for manifest entry unknown: {}", url));
                None
            }
        },
    }
}

fn replace_urls(state: &mut State, url_pattern: &Regex, content: &str, escape: bool) -> String {
    url_pattern
        .replace_all(content, |c: &Captures<'_>| match manifest_url(state, &c[0]) {
            Some(url) if escape => html_escape::encode_quoted_attribute(&url).into_owned(),
            Some(url) => url,
            None => c[0].to_string(),
        })
        .into_owned()
}

/// Replace every `assetplan://manifest/NAME` in `content` with the URL of
/// that manifest entry. Unresolvable references are recorded as errors and
/// left as they were.
pub fn replace_manifest_urls(state: &mut State, content: &str) -> PlanResult<String> {
    let url = compile("manifest-urls", ASSETPLAN_URL)?;
    Ok(replace_urls(state, &url, content, false))
}

#[derive(Debug, Clone)]
pub struct Html {
    modify: Modify,
}

impl Html {
    /// Process files ending in `.html`
    pub fn new() -> PlanResult<Self> {
        Self::matching(compile("html", HTML_FILES)?)
    }

    pub fn matching(test: impl Into<FilenameTest>) -> PlanResult<Self> {
        let test = test.into();
        let patterns = Rc::new(Patterns::new()?);
        let modify = Modify::stateful(move |state, input| {
            if !test.matches(input) {
                return None;
            }
            let html = match input.content() {
                Ok(html) => html,
                Err(e) => {
                    state.add_error(e.to_string());
                    return None;
                }
            };
            let html = expand_require_tags(state, &patterns, &html);
            let html = replace_urls(state, &patterns.url, &html, true);
            Some(Modification::content(html))
        })
        .named("html");
        Ok(Self { modify })
    }
}

impl Plugin for Html {
    fn name(&self) -> &str {
        "html"
    }

    fn run(&self, state: &mut State) -> PlanResult<()> {
        self.modify.run(state)
    }
}

/// Rewrites `assetplan://manifest/NAME` references in matching text files
#[derive(Debug, Clone)]
pub struct ManifestUrls {
    modify: Modify,
}

impl ManifestUrls {
    pub fn matching(test: impl Into<FilenameTest>) -> PlanResult<Self> {
        let test = test.into();
        let url = compile("manifest-urls", ASSETPLAN_URL)?;
        let modify = Modify::stateful(move |state, input| {
            if !test.matches(input) {
                return None;
            }
            match input.content() {
                Ok(content) => Some(Modification::content(replace_urls(
                    state, &url, &content, false,
                ))),
                Err(e) => {
                    state.add_error(e.to_string());
                    None
                }
            }
        })
        .named("manifest-urls");
        Ok(Self { modify })
    }
}

impl Plugin for ManifestUrls {
    fn name(&self) -> &str {
        "manifest-urls"
    }

    fn run(&self, state: &mut State) -> PlanResult<()> {
        self.modify.run(state)
    }
}
