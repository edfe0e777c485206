//! Manifest entity
//!
//! Maps manifest names (chosen independently of asset names) to where the
//! asset can be loaded from. Entries keep insertion order so the rendered
//! JSON is deterministic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::value_objects::{As, CrossOrigin, UrlEntry};
use crate::error::PlanResult;

/// A CDN reference as recorded in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnRef {
    pub url: String,
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub as_: Option<As>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
}

/// One manifest value: `{"local": …}`, `{"cdn": …}`, `{"url": …}` or `{"list": …}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestEntry {
    Local(String),
    Cdn(CdnRef),
    Url(UrlEntry),
    List(Vec<String>),
}

impl ManifestEntry {
    /// Best-effort single URL: local path, then `url.url`, then the CDN url
    /// when `allow_cdn` is set. Lists have no single URL.
    pub fn resolve_url(&self, allow_cdn: bool) -> Option<&str> {
        match self {
            ManifestEntry::Local(path) => Some(path),
            ManifestEntry::Url(entry) => Some(&entry.url),
            ManifestEntry::Cdn(cdn) if allow_cdn => Some(&cdn.url),
            ManifestEntry::Cdn(_) | ManifestEntry::List(_) => None,
        }
    }

    /// URL entry suitable for emitting a load tag
    pub fn to_url_entry(&self) -> Option<UrlEntry> {
        match self {
            ManifestEntry::Cdn(cdn) => Some(
                UrlEntry::new(cdn.url.clone())
                    .with_integrity(cdn.integrity.clone())
                    .with_crossorigin(CrossOrigin::Anonymous)
                    .with_as(cdn.as_),
            ),
            other => other.resolve_url(false).map(UrlEntry::new),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: IndexMap<String, ManifestEntry>,
    warnings: Vec<String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Overwriting with a different value is reported.
    pub fn add_entry(&mut self, key: impl Into<String>, entry: ManifestEntry) {
        let key = key.into();
        if let Some(old) = self.entries.get(&key) {
            if *old != entry {
                let shown = serde_json::json!({ key.as_str(): old });
                let message = format!("Overwriting manifest entry: {}", shown);
                warn!("{}", message);
                self.warnings.push(message);
            }
        }
        self.entries.insert(key, entry);
    }

    pub fn add_path_local(&mut self, key: impl Into<String>, path: impl Into<String>) {
        self.add_entry(key, ManifestEntry::Local(path.into()));
    }

    pub fn add_path_cdn(&mut self, key: impl Into<String>, cdn: CdnRef) {
        self.add_entry(key, ManifestEntry::Cdn(cdn));
    }

    pub fn add_url(&mut self, key: impl Into<String>, url: UrlEntry) {
        self.add_entry(key, ManifestEntry::Url(url));
    }

    pub fn add_list(&mut self, key: impl Into<String>, urls: Vec<String>) {
        self.add_entry(key, ManifestEntry::List(urls));
    }

    /// Remove an entry, keeping the order of the rest
    pub fn delete(&mut self, key: &str) -> Option<ManifestEntry> {
        self.entries.shift_remove(key)
    }

    /// Rewrite every entry in place
    pub fn map_values(&mut self, mut f: impl FnMut(&ManifestEntry) -> ManifestEntry) {
        for entry in self.entries.values_mut() {
            *entry = f(entry);
        }
    }

    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> &IndexMap<String, ManifestEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON, two-space indent, insertion order
    pub fn serialize(&self) -> PlanResult<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Drain warnings raised by overwrites
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}
