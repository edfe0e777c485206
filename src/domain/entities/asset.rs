//! Asset definitions
//!
//! An [`AssetValue`] is what a name maps to in the `assets` or `optional`
//! tables. Values are parsed from a loosely typed tree so that a malformed
//! asset becomes an [`AssetValue::Invalid`] reported for that asset alone,
//! instead of failing the whole config load.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::domain::value_objects::path::{basename, dirname, extname, stem};

/// Programmatic manifest naming: matched path in, optional manifest name out
pub type ManifestNameFn = Rc<dyn Fn(&str) -> Option<String>>;

/// Programmatic validation: `(matched files, glob, src dir) -> messages`
pub type ValidateFn = Rc<dyn Fn(&[String], &str, &Path) -> Vec<String>>;

/// How an asset contributes to the manifest
#[derive(Clone, Default)]
pub enum ManifestSetting {
    /// No manifest entry
    #[default]
    None,
    /// `true`: use the asset name
    Derive,
    /// An explicit manifest name
    Name(String),
    /// A name built from the matched path's `[name]`, `[ext]`, `[basename]`, `[path]`
    Template(String),
    /// A naming function; `None` skips the file
    Fn(ManifestNameFn),
    /// Anything else, kept as JSON for the error message
    Invalid(String),
}

impl ManifestSetting {
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) | Some(Value::Bool(false)) => ManifestSetting::None,
            Some(Value::Bool(true)) => ManifestSetting::Derive,
            Some(Value::String(s)) if s.is_empty() => ManifestSetting::None,
            Some(Value::String(s)) => ManifestSetting::Name(s.clone()),
            Some(Value::Object(map)) => match map.get("template") {
                Some(Value::String(t)) if map.len() == 1 => ManifestSetting::Template(t.clone()),
                _ => ManifestSetting::Invalid(Value::Object(map.clone()).to_string()),
            },
            Some(other) => ManifestSetting::Invalid(other.to_string()),
        }
    }

    pub fn func(f: impl Fn(&str) -> Option<String> + 'static) -> Self {
        ManifestSetting::Fn(Rc::new(f))
    }

    pub fn is_derive(&self) -> bool {
        matches!(self, ManifestSetting::Derive)
    }
}

impl fmt::Debug for ManifestSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestSetting::None => f.write_str("None"),
            ManifestSetting::Derive => f.write_str("Derive"),
            ManifestSetting::Name(n) => f.debug_tuple("Name").field(n).finish(),
            ManifestSetting::Template(t) => f.debug_tuple("Template").field(t).finish(),
            ManifestSetting::Fn(_) => f.write_str("Fn(..)"),
            ManifestSetting::Invalid(v) => f.debug_tuple("Invalid").field(v).finish(),
        }
    }
}

/// Substitute the path tokens of a manifest name template
pub fn render_manifest_template(template: &str, path: &str) -> String {
    template
        .replace("[basename]", basename(path))
        .replace("[name]", stem(path))
        .replace("[ext]", extname(path))
        .replace("[path]", dirname(path))
}

/// Checks applied to the files a local glob matched
#[derive(Clone, Default)]
pub enum Validator {
    /// Zero matches is an error
    #[default]
    Default,
    /// Any result passes
    Disabled,
    /// Always fails with the message
    Fail(String),
    /// Bounds on the number of matches
    Count { min: Option<u64>, max: Option<u64> },
    Custom(ValidateFn),
}

impl Validator {
    pub fn custom(f: impl Fn(&[String], &str, &Path) -> Vec<String> + 'static) -> Self {
        Validator::Custom(Rc::new(f))
    }

    /// Validation messages; empty means the files are acceptable
    pub fn check(&self, files: &[String], glob: &str, src: &Path) -> Vec<String> {
        let mut messages = match self {
            Validator::Default if files.is_empty() => vec!["0 files found.".to_string()],
            Validator::Default | Validator::Disabled => Vec::new(),
            Validator::Fail(message) => vec![message.clone()],
            Validator::Count { min, max } => {
                let found = files.len() as u64;
                let mut out = Vec::new();
                if let Some(min) = min.filter(|min| found < *min) {
                    out.push(format!("Expected at least {} files, found {}.", min, found));
                }
                if let Some(max) = max.filter(|max| found > *max) {
                    out.push(format!("Expected at most {} files, found {}.", max, found));
                }
                out
            }
            Validator::Custom(f) => f(files, glob, src),
        };
        messages.retain(|m| !m.is_empty());
        messages
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Default => f.write_str("Default"),
            Validator::Disabled => f.write_str("Disabled"),
            Validator::Fail(m) => f.debug_tuple("Fail").field(m).finish(),
            Validator::Count { min, max } => f
                .debug_struct("Count")
                .field("min", min)
                .field("max", max)
                .finish(),
            Validator::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One or more files matched by a glob, copied to the output directory
#[derive(Debug, Clone, Default)]
pub struct LocalAsset {
    pub files: Option<String>,
    pub src: Option<String>,
    pub output_name: Option<String>,
    pub output_path: Option<String>,
    pub manifest: ManifestSetting,
    pub validate: Validator,
    pub transitive: Option<bool>,
}

impl LocalAsset {
    pub fn new(files: impl Into<String>) -> Self {
        Self {
            files: Some(files.into()),
            ..Self::default()
        }
    }

    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn output_name(mut self, template: impl Into<String>) -> Self {
        self.output_name = Some(template.into());
        self
    }

    pub fn output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn manifest(mut self, manifest: ManifestSetting) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn validate(mut self, validate: Validator) -> Self {
        self.validate = validate;
        self
    }

    pub fn transitive(mut self, transitive: bool) -> Self {
        self.transitive = Some(transitive);
        self
    }
}

/// A path served by something else; produces no op
#[derive(Debug, Clone, Default)]
pub struct ExternalAsset {
    pub path: Option<String>,
    pub manifest: ManifestSetting,
}

impl ExternalAsset {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            manifest: ManifestSetting::None,
        }
    }

    pub fn manifest(mut self, manifest: ManifestSetting) -> Self {
        self.manifest = manifest;
        self
    }
}

/// Source of a CDN asset's SRI attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integrity {
    /// A trusted value used verbatim
    Literal(String),
    /// Hash local copies of the resource with each algorithm
    FromFiles {
        files: Option<String>,
        algos: Vec<String>,
    },
    /// Anything else, kept as JSON for the error message
    Invalid(String),
}

impl Integrity {
    pub fn from_files(files: impl Into<String>, algos: &[&str]) -> Self {
        Integrity::FromFiles {
            files: Some(files.into()),
            algos: algos.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn from_json(value: Option<&Value>) -> Option<Self> {
        match value? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(Integrity::Literal(s.clone())),
            Value::Object(map) => Some(Self::from_object(map)),
            other => Some(Integrity::Invalid(other.to_string())),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let invalid = || Integrity::Invalid(Value::Object(map.clone()).to_string());
        let files = match map.get("files") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return invalid(),
        };
        let algos = match map.get("algo") {
            None | Some(Value::Null) => vec!["sha256".to_string()],
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => {
                let mut algos = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => algos.push(s.clone()),
                        _ => return invalid(),
                    }
                }
                algos
            }
            Some(_) => return invalid(),
        };
        Integrity::FromFiles { files, algos }
    }
}

/// A remote resource
#[derive(Debug, Clone, Default)]
pub struct CdnAsset {
    pub url: Option<String>,
    pub integrity: Option<Integrity>,
    /// Raw `as` value; checked during resolution
    pub as_: Option<String>,
    pub manifest: ManifestSetting,
}

impl CdnAsset {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn integrity(mut self, integrity: Integrity) -> Self {
        self.integrity = Some(integrity);
        self
    }

    pub fn as_(mut self, as_: impl Into<String>) -> Self {
        self.as_ = Some(as_.into());
        self
    }

    pub fn manifest(mut self, manifest: ManifestSetting) -> Self {
        self.manifest = manifest;
        self
    }
}

/// Why an asset value could not be understood
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidAsset {
    /// Object with a missing or unknown `type`
    Type(String),
    /// Neither a string, an array nor an object
    Value(String),
    /// A known key holding the wrong kind of value
    Field {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl InvalidAsset {
    pub fn message(&self, name: &str) -> String {
        match self {
            InvalidAsset::Type(t) => format!("{} has invalid asset type: {}", name, t),
            InvalidAsset::Value(v) => format!("{} has an invalid value: {}", name, v),
            InvalidAsset::Field {
                key,
                expected,
                found,
            } => format!(
                "Invalid config in {}: {} must be of type {} but is {}.",
                name, key, expected, found
            ),
        }
    }
}

/// What an asset name maps to
#[derive(Debug, Clone)]
pub enum AssetValue {
    /// Alias: a dependency on another asset
    Ref(String),
    /// Ordered group, flattened during resolution
    Bundle(Vec<AssetValue>),
    Local(LocalAsset),
    External(ExternalAsset),
    Cdn(CdnAsset),
    Invalid(InvalidAsset),
}

impl From<&str> for AssetValue {
    fn from(target: &str) -> Self {
        AssetValue::Ref(target.to_string())
    }
}

impl From<LocalAsset> for AssetValue {
    fn from(asset: LocalAsset) -> Self {
        AssetValue::Local(asset)
    }
}

impl From<ExternalAsset> for AssetValue {
    fn from(asset: ExternalAsset) -> Self {
        AssetValue::External(asset)
    }
}

impl From<CdnAsset> for AssetValue {
    fn from(asset: CdnAsset) -> Self {
        AssetValue::Cdn(asset)
    }
}

const LOCAL_KEYS: &[&str] = &[
    "type",
    "files",
    "src",
    "output_name",
    "outputName",
    "output_path",
    "outputPath",
    "manifest",
    "validate",
    "transitive",
];
const EXTERNAL_KEYS: &[&str] = &["type", "path", "manifest"];
const CDN_KEYS: &[&str] = &["type", "url", "integrity", "as", "manifest"];

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Result<Option<String>, InvalidAsset> {
    for key in keys {
        match map.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.is_empty() => return Ok(None),
            Some(Value::String(s)) => return Ok(Some(s.clone())),
            Some(other) => {
                return Err(InvalidAsset::Field {
                    key: key.to_string(),
                    expected: "string",
                    found: type_name(other),
                })
            }
        }
    }
    Ok(None)
}

fn bool_field(map: &Map<String, Value>, key: &str) -> Result<Option<bool>, InvalidAsset> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(InvalidAsset::Field {
            key: key.to_string(),
            expected: "boolean",
            found: type_name(other),
        }),
    }
}

fn validator_field(map: &Map<String, Value>) -> Result<Validator, InvalidAsset> {
    let bad = |found: &Value| InvalidAsset::Field {
        key: "validate".to_string(),
        expected: "boolean, string or table",
        found: type_name(found),
    };
    match map.get("validate") {
        None | Some(Value::Null) => Ok(Validator::Default),
        Some(Value::Bool(_)) => Ok(Validator::Disabled),
        Some(Value::String(s)) => Ok(Validator::Fail(s.clone())),
        Some(Value::Object(bounds)) => {
            let bound = |key: &str| match bounds.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(v) => v.as_u64().map(Some).ok_or_else(|| bad(v)),
            };
            Ok(Validator::Count {
                min: bound("min")?,
                max: bound("max")?,
            })
        }
        Some(other) => Err(bad(other)),
    }
}

fn unknown_keys(map: &Map<String, Value>, known: &[&str], unknown: &mut Vec<String>) {
    unknown.extend(
        map.keys()
            .filter(|k| !known.contains(&k.as_str()))
            .cloned(),
    );
}

impl AssetValue {
    /// Parse a loosely typed value. Keys that no asset kind understands are
    /// appended to `unknown`.
    pub fn from_json(value: &Value, unknown: &mut Vec<String>) -> Self {
        match value {
            Value::String(target) => AssetValue::Ref(target.clone()),
            Value::Array(items) => AssetValue::Bundle(
                items
                    .iter()
                    .map(|item| AssetValue::from_json(item, unknown))
                    .collect(),
            ),
            Value::Object(map) => {
                let parsed = match map.get("type").and_then(Value::as_str) {
                    Some("local") => {
                        unknown_keys(map, LOCAL_KEYS, unknown);
                        Self::parse_local(map)
                    }
                    Some("external") => {
                        unknown_keys(map, EXTERNAL_KEYS, unknown);
                        Self::parse_external(map)
                    }
                    Some("cdn") => {
                        unknown_keys(map, CDN_KEYS, unknown);
                        Self::parse_cdn(map)
                    }
                    _ => Err(InvalidAsset::Type(
                        map.get("type").cloned().unwrap_or(Value::Null).to_string(),
                    )),
                };
                parsed.unwrap_or_else(AssetValue::Invalid)
            }
            other => AssetValue::Invalid(InvalidAsset::Value(other.to_string())),
        }
    }

    fn parse_local(map: &Map<String, Value>) -> Result<Self, InvalidAsset> {
        Ok(AssetValue::Local(LocalAsset {
            files: string_field(map, &["files"])?,
            src: string_field(map, &["src"])?,
            output_name: string_field(map, &["output_name", "outputName"])?,
            output_path: string_field(map, &["output_path", "outputPath"])?,
            manifest: ManifestSetting::from_json(map.get("manifest")),
            validate: validator_field(map)?,
            transitive: bool_field(map, "transitive")?,
        }))
    }

    fn parse_external(map: &Map<String, Value>) -> Result<Self, InvalidAsset> {
        Ok(AssetValue::External(ExternalAsset {
            path: string_field(map, &["path"])?,
            manifest: ManifestSetting::from_json(map.get("manifest")),
        }))
    }

    fn parse_cdn(map: &Map<String, Value>) -> Result<Self, InvalidAsset> {
        Ok(AssetValue::Cdn(CdnAsset {
            url: string_field(map, &["url"])?,
            integrity: Integrity::from_json(map.get("integrity")),
            as_: string_field(map, &["as"])?,
            manifest: ManifestSetting::from_json(map.get("manifest")),
        }))
    }
}

/// An ordered `name = value` table. Duplicate names are kept so they can be
/// reported rather than silently collapsed.
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    entries: Vec<(String, AssetValue)>,
    warnings: Vec<String>,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AssetValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Builder form of [`AssetTable::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AssetValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AssetValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Warnings found while parsing (unknown keys)
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn push_json(&mut self, name: String, value: &Value) {
        let mut unknown = Vec::new();
        let asset = AssetValue::from_json(value, &mut unknown);
        for key in unknown {
            self.warnings.push(format!("{} has unknown key: {}", name, key));
        }
        self.entries.push((name, asset));
    }
}

impl<'de> Deserialize<'de> for AssetTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = AssetTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of asset definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<AssetTable, A::Error> {
                let mut table = AssetTable::new();
                while let Some((name, value)) = map.next_entry::<String, Value>()? {
                    table.push_json(name, &value);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}
