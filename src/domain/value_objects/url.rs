//! URL entry value objects
//!
//! A URL entry is one servable location registered for an asset. Local
//! assets register one entry per matched file; CDN and external assets
//! register exactly one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a CDN resource should be loaded, overriding extension sniffing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum As {
    Script,
    Style,
}

impl As {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "script" => Some(As::Script),
            "style" => Some(As::Style),
            _ => None,
        }
    }
}

impl fmt::Display for As {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            As::Script => f.write_str("script"),
            As::Style => f.write_str("style"),
        }
    }
}

/// The `crossorigin` attribute value. Only `anonymous` is ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossOrigin {
    Anonymous,
}

impl fmt::Display for CrossOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("anonymous")
    }
}

/// A servable URL registered for an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crossorigin: Option<CrossOrigin>,
    /// Present when the asset declared `transitive` explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitive: Option<bool>,
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub as_: Option<As>,
}

impl UrlEntry {
    /// A bare URL with no metadata
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            integrity: None,
            crossorigin: None,
            transitive: None,
            as_: None,
        }
    }

    pub fn with_integrity(mut self, integrity: Option<String>) -> Self {
        self.integrity = integrity;
        self
    }

    pub fn with_crossorigin(mut self, crossorigin: CrossOrigin) -> Self {
        self.crossorigin = Some(crossorigin);
        self
    }

    pub fn with_transitive(mut self, transitive: Option<bool>) -> Self {
        self.transitive = transitive;
        self
    }

    pub fn with_as(mut self, as_: Option<As>) -> Self {
        self.as_ = as_;
        self
    }

    /// Transitive entries support other assets and are never loaded directly
    pub fn is_transitive(&self) -> bool {
        self.transitive.unwrap_or(false)
    }
}
